use clap::{CommandFactory, Parser};
use colored::*;
use eyre::{eyre, Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use reelr::config::Config;
use reelr::pipeline::ProductionPipeline;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("reelr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
        Some(Commands::Produce { topic, duration }) => {
            handle_produce_command(topic, *duration, config).await
        }
    }
}

async fn handle_produce_command(topic: &str, duration: Option<u32>, config: &Config) -> Result<()> {
    let duration = duration.unwrap_or(config.production.default_duration_secs);
    info!("Producing video for topic: {} ({}s)", topic, duration);

    println!("{} {} ({}s)", "Producing:".green(), topic, duration);

    let pipeline = ProductionPipeline::new(config)?;
    let result = pipeline.produce(topic, duration).await?;
    pipeline.shutdown();

    if result.success {
        println!("{}", "Video production completed".green());
        if let Some(video) = &result.video {
            println!("  {} {}", "Video:".cyan(), video["file"].as_str().unwrap_or("?"));
            println!(
                "  {} {}s across {} slides",
                "Duration:".cyan(),
                video["duration_seconds"],
                video["slide_count"]
            );
        }
        if let Some(score) = result.quality_score {
            let standards = if result.meets_standards {
                "meets standards".green()
            } else {
                "below standards".yellow()
            };
            println!("  {} {:.2} ({})", "Quality score:".cyan(), score, standards);
        }
        println!("  {} {}", "Workflow:".cyan(), result.workflow_id);
        Ok(())
    } else {
        println!("{}", "Video production failed".red());
        if let Some(error) = &result.error {
            println!("  {}", error);
        }
        Err(eyre!("production failed for topic: {}", topic))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
