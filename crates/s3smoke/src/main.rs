//! s3smoke - main entry point

use clap::Parser;
use s3smoke::{report, Cli, HarnessConfig, Runner, S3Store};
use s3smoke_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Verbose mode logs debug to stderr; otherwise only warnings and errors,
    // so the step narration on stdout stays readable
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .log_file_prefix("s3smoke")
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env_with(log_config.clone()).unwrap_or(log_config);

    // The smoke test works without logging
    let guard = init_logging(&log_config).ok();

    let code = execute(&cli).await;

    drop(guard);
    process::exit(code);
}

/// Run the smoke test and return the process exit code
async fn execute(cli: &Cli) -> i32 {
    let config = match HarnessConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration incomplete");
            println!("{}", report::usage_text());
            return 1;
        }
    };

    report::print_banner(&config);

    let store = match S3Store::new(&config) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Client construction failed");
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let report = Runner::new(&store, config.bucket.clone()).run().await;
    report::print_summary(&report);

    report.exit_code()
}
