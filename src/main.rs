//! Tweet Media Archiver - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tweet_media_archiver::{
    api::{TwitterApi, UserTimeline},
    cli::Args,
    config::{validate_config, Config},
    download::archive_timeline,
    error::{exit_codes, Result},
    fs::{ensure_dir, target_directory},
    output::{
        print_banner, print_config_summary, print_error, print_info, print_run_stats,
        print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Pick up credentials from .env before clap reads its env fallbacks
    let env_file = dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let mut config = Config::from_env()?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    let target_dir = target_directory(&config)?;
    print_config_summary(
        &config.target_user_id,
        &config.options.api_version.to_string(),
        &target_dir.display().to_string(),
    );

    ensure_dir(&target_dir).await?;

    print_info("Connecting to Twitter...");
    let api = TwitterApi::new(config.credentials.clone())?;
    let mut timeline = UserTimeline::new(api.clone(), &config);
    let extractor = config.options.api_version.extractor();

    let stats = archive_timeline(
        &api,
        &config,
        &mut timeline,
        extractor.as_ref(),
        &target_dir,
    )
    .await?;

    print_run_stats(&config.target_user_id, &stats);

    if stats.skipped_count > 0 {
        print_warning(&format!(
            "{} media item(s) had no direct URL and were skipped",
            stats.skipped_count
        ));
    }

    print_success(&format!(
        "Archived {} file(s) into {}",
        stats.total_downloaded(),
        target_dir.display()
    ));

    Ok(())
}
