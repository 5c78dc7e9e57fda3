//! Front-end build artifact probe.
//!
//! Reads `build/manifest.json` and `build/entrypoints.json` under the public
//! directory. No network involved.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::probe::{FailureKind, Probe, ServiceStatus};

pub const DEFAULT_NAME: &str = "Webpack Encore";
pub const BUILD_DIR: &str = "build";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const ENTRYPOINTS_FILE: &str = "entrypoints.json";
const BUILD_HINT: &str = "Run: npm run build or npm run dev";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing build artifact {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("malformed {}: {source}", .path.display())]
    Malformed { path: PathBuf, source: serde_json::Error },
}

impl AssetError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AssetError::Missing(_) => FailureKind::MissingArtifact,
            AssetError::Io { .. } | AssetError::Malformed { .. } => FailureKind::ApplicationError,
        }
    }
}

/// `manifest.json`: logical asset path → hashed output path.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest(pub BTreeMap<String, String>);

/// One entry point's output files, either flat or grouped by file type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntryGroup {
    Files(Vec<String>),
    ByType(BTreeMap<String, Vec<String>>),
}

/// `entrypoints.json`.
#[derive(Debug, Deserialize)]
pub struct Entrypoints {
    #[serde(default)]
    pub entrypoints: BTreeMap<String, EntryGroup>,
}

/// Counts extracted from a compiled build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub assets: usize,
    pub entrypoints: usize,
}

pub struct AssetManifestProbe {
    name: String,
    public_dir: PathBuf,
}

impl AssetManifestProbe {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            public_dir: public_dir.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn build_dir(&self) -> PathBuf {
        self.public_dir.join(BUILD_DIR)
    }

    pub async fn summarize(&self) -> Result<BuildSummary, AssetError> {
        let manifest_path = self.build_dir().join(MANIFEST_FILE);
        let entrypoints_path = self.build_dir().join(ENTRYPOINTS_FILE);

        // Both must exist before either is parsed.
        for path in [&manifest_path, &entrypoints_path] {
            if !exists(path).await? {
                return Err(AssetError::Missing(path.clone()));
            }
        }

        let manifest: AssetManifest = read_json(&manifest_path).await?;
        let entrypoints: Entrypoints = read_json(&entrypoints_path).await?;

        Ok(BuildSummary {
            assets: manifest.0.len(),
            entrypoints: entrypoints.entrypoints.len(),
        })
    }
}

async fn exists(path: &Path) -> Result<bool, AssetError> {
    tokio::fs::try_exists(path).await.map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AssetError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AssetError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw).map_err(|source| AssetError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait]
impl Probe for AssetManifestProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> ServiceStatus {
        let start = Instant::now();
        let status = match self.summarize().await {
            Ok(summary) => ServiceStatus::connected(&self.name, "Encore assets compiled").with_details(
                format!("{} assets, {} entrypoints", summary.assets, summary.entrypoints),
            ),
            Err(AssetError::Missing(path)) => {
                tracing::info!(path = %path.display(), "Build artifacts not found");
                ServiceStatus::failed(&self.name, FailureKind::MissingArtifact, "Encore assets missing")
                    .with_details(BUILD_HINT)
            }
            Err(e) => {
                tracing::error!(error = %e, "Asset manifest check failed");
                ServiceStatus::failed(&self.name, e.kind(), "Encore check failed").with_error(&e)
            }
        };
        status.with_elapsed(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Severity;

    fn write_build(root: &Path, manifest: &str, entrypoints: &str) {
        let build = root.join(BUILD_DIR);
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join(MANIFEST_FILE), manifest).unwrap();
        std::fs::write(build.join(ENTRYPOINTS_FILE), entrypoints).unwrap();
    }

    #[tokio::test]
    async fn test_counts_assets_and_entrypoints() {
        let dir = tempfile::tempdir().unwrap();
        write_build(
            dir.path(),
            r#"{"a.js":"a.1.js","b.css":"b.1.css"}"#,
            r#"{"entrypoints":{"app":["a.1.js","b.1.css"]}}"#,
        );

        let status = AssetManifestProbe::new(dir.path()).check().await;
        assert!(status.connected);
        assert_eq!(status.details.as_deref(), Some("2 assets, 1 entrypoints"));
    }

    #[tokio::test]
    async fn test_grouped_entrypoints() {
        let dir = tempfile::tempdir().unwrap();
        write_build(
            dir.path(),
            r#"{"build/app.js":"/build/app.3f2a.js"}"#,
            r#"{"entrypoints":{"app":{"js":["/build/app.3f2a.js"]},"admin":{"js":[],"css":[]}}}"#,
        );

        let summary = AssetManifestProbe::new(dir.path()).summarize().await.unwrap();
        assert_eq!(summary, BuildSummary { assets: 1, entrypoints: 2 });
    }

    #[tokio::test]
    async fn test_missing_files_warn() {
        let dir = tempfile::tempdir().unwrap();
        let status = AssetManifestProbe::new(dir.path()).check().await;
        assert!(!status.connected);
        assert_eq!(status.severity, Severity::Warning);
        assert_eq!(status.failure, Some(FailureKind::MissingArtifact));
        assert_eq!(status.details.as_deref(), Some(BUILD_HINT));
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_one_file_missing_warns() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join(BUILD_DIR);
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join(MANIFEST_FILE), "{}").unwrap();

        let status = AssetManifestProbe::new(dir.path()).check().await;
        assert_eq!(status.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_build(dir.path(), "{not json", r#"{"entrypoints":{}}"#);

        let status = AssetManifestProbe::new(dir.path()).check().await;
        assert!(!status.connected);
        assert_eq!(status.severity, Severity::Error);
        assert!(status.error.unwrap().contains("manifest.json"));
    }
}
