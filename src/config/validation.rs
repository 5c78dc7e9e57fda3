//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that URLs and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DashboardConfig → Result<(), Vec<ValidationError>>
//! - Disabled probes are not validated

use std::net::SocketAddr;
use thiserror::Error;
use crate::config::schema::DashboardConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: invalid address '{value}'")]
    Address { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}'")]
    Url { field: &'static str, value: String },

    #[error("{field}: must not be empty")]
    Empty { field: &'static str },

    #[error("dashboard.deadline_secs ({deadline}) must not be below the slowest probe ceiling ({ceiling})")]
    DeadlineTooShort { deadline: u64, ceiling: u64 },

    #[error("listener.request_timeout_secs ({timeout}) must exceed dashboard.deadline_secs ({deadline})")]
    RequestTimeoutTooShort { timeout: u64, deadline: u64 },
}

pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "listener.request_timeout_secs" });
    }
    if config.dashboard.deadline_secs == 0 {
        errors.push(ValidationError::Zero { field: "dashboard.deadline_secs" });
    }

    let labels = [
        (config.database.enabled, &config.database.display_name, "database.display_name"),
        (config.cache.enabled, &config.cache.display_name, "cache.display_name"),
        (config.mail.enabled, &config.mail.display_name, "mail.display_name"),
        (config.assets.enabled, &config.assets.display_name, "assets.display_name"),
    ];
    for (enabled, name, field) in labels {
        if enabled && name.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    let mut ceiling = 0;

    if config.database.enabled {
        if url::Url::parse(&config.database.url).is_err() {
            errors.push(ValidationError::Url {
                field: "database.url",
                value: config.database.url.clone(),
            });
        }
        if config.database.timeout_secs == 0 {
            errors.push(ValidationError::Zero { field: "database.timeout_secs" });
        }
        if config.database.max_connections == 0 {
            errors.push(ValidationError::Zero { field: "database.max_connections" });
        }
        ceiling = ceiling.max(config.database.timeout_secs);
    }

    if config.cache.enabled {
        if config.cache.host.trim().is_empty() {
            errors.push(ValidationError::Empty { field: "cache.host" });
        }
        if config.cache.port == 0 {
            errors.push(ValidationError::Zero { field: "cache.port" });
        }
        if config.cache.timeout_secs == 0 {
            errors.push(ValidationError::Zero { field: "cache.timeout_secs" });
        }
        ceiling = ceiling.max(config.cache.timeout_secs);
    }

    if config.mail.enabled {
        match url::Url::parse(&config.mail.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => errors.push(ValidationError::Url {
                field: "mail.base_url",
                value: config.mail.base_url.clone(),
            }),
        }
        if config.mail.timeout_secs == 0 {
            errors.push(ValidationError::Zero { field: "mail.timeout_secs" });
        }
        ceiling = ceiling.max(config.mail.timeout_secs);
    }

    if config.assets.enabled && config.assets.public_dir.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "assets.public_dir" });
    }

    if config.dashboard.deadline_secs > 0 && config.dashboard.deadline_secs < ceiling {
        errors.push(ValidationError::DeadlineTooShort {
            deadline: config.dashboard.deadline_secs,
            ceiling,
        });
    }

    // The report must be ready before the router gives up on the request.
    if config.listener.request_timeout_secs > 0
        && config.dashboard.deadline_secs > 0
        && config.listener.request_timeout_secs <= config.dashboard.deadline_secs
    {
        errors.push(ValidationError::RequestTimeoutTooShort {
            timeout: config.listener.request_timeout_secs,
            deadline: config.dashboard.deadline_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DashboardConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = DashboardConfig::default();
        config.cache.port = 0;
        config.mail.base_url = "mailhog".to_string();
        config.listener.bind_address = "nowhere".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero { field: "cache.port" }));
    }

    #[test]
    fn test_disabled_probe_skipped() {
        let mut config = DashboardConfig::default();
        config.database.enabled = false;
        config.database.url = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_blank_display_name() {
        let mut config = DashboardConfig::default();
        config.mail.display_name = "  ".to_string();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Empty { field: "mail.display_name" }])
        );

        config.mail.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_deadline_below_ceiling() {
        let mut config = DashboardConfig::default();
        config.mail.timeout_secs = 20;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DeadlineTooShort { deadline: 10, ceiling: 20 }]
        );
    }

    #[test]
    fn test_request_timeout_must_outlast_deadline() {
        let mut config = DashboardConfig::default();
        config.cache.timeout_secs = 3;
        config.dashboard.deadline_secs = 3;
        config.listener.request_timeout_secs = 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestTimeoutTooShort { timeout: 1, deadline: 3 }]
        );

        config.listener.request_timeout_secs = 3;
        assert!(validate_config(&config).is_err());

        config.listener.request_timeout_secs = 4;
        assert!(validate_config(&config).is_ok());
    }
}
