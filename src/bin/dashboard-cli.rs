use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use serde_json::Value;

use service_dashboard::config::{load_config, DashboardConfig};
use service_dashboard::observability::logging;
use service_dashboard::ProbeSet;

#[derive(Parser)]
#[command(name = "dashboard-cli")]
#[command(about = "Check backing services once, locally or through a running dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every probe once in-process and print the report
    Check {
        /// Dashboard config file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log level for probe diagnostics
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
    /// Fetch the report from a running dashboard server
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config, log_level } => {
            logging::init(&log_level);
            let config = match config {
                Some(path) => load_config(&path)?,
                None => DashboardConfig::default(),
            };
            let report = ProbeSet::from_config(&config)?.run().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_operational() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Status { url } => {
            let client = reqwest::Client::new();
            let res = client
                .get(format!("{}/api/status", url.trim_end_matches('/')))
                .send()
                .await?;
            print_response(res).await
        }
    }
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: dashboard returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
