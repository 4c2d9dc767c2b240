use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use pr_pulse::config::Settings;
use pr_pulse::error::PulseError;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SwitchState {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check for a new pull request and flash its pulse (default if no subcommand)
    Poll,
    /// Report review threads left unanswered after new commits
    Stale,
    /// List completed pull requests with how long each stayed open
    History {
        /// Print the summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn the notification light on or off
    Switch {
        #[arg(value_enum)]
        state: SwitchState,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pr-pulse")]
#[command(
    about = "Pulse a notification light for new Azure DevOps pull requests",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/pr-pulse/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    pr_pulse::logging::init_logging(cli.verbose);

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(EXIT_NETWORK);
    }

    let command = cli.command.unwrap_or(Commands::Poll);
    let start_time = Instant::now();

    // A poll without a token reports `{"success": false}` whatever else is
    // configured, so it is answered before settings are parsed.
    if matches!(command, Commands::Poll) {
        let lookup = |name: &str| std::env::var(name).ok();
        if let Some(outcome) = pr_pulse::poll::missing_token_outcome(lookup) {
            tracing::warn!("no personal access token configured");
            if let Err(e) = print_json(&outcome) {
                eprintln!("Error: {}", e);
                std::process::exit(exit_code(&e));
            }
            std::process::exit(EXIT_SUCCESS);
        }
    }

    let settings = match pr_pulse::config::load_settings(cli.config.map(PathBuf::from)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate settings at startup
    if let Err(errors) = pr_pulse::config::validate_settings(&settings) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let result = match command {
        Commands::Poll => run_poll(&settings).await,
        Commands::Stale => run_stale(&settings).await,
        Commands::History { json } => run_history(&settings, json).await,
        Commands::Switch { state } => run_switch(&settings, state).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }

    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(EXIT_SUCCESS);
}

fn exit_code(error: &PulseError) -> i32 {
    match error {
        PulseError::MissingCredential | PulseError::Authentication { .. } => EXIT_AUTH,
        PulseError::Configuration { .. } | PulseError::Encode { .. } => EXIT_CONFIG,
        _ => EXIT_NETWORK,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), PulseError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| PulseError::encode("output", e))?;
    println!("{}", json);
    Ok(())
}

async fn run_poll(settings: &Settings) -> Result<(), PulseError> {
    let outcome = pr_pulse::poll::run(settings, chrono::Utc::now()).await?;
    print_json(&outcome)
}

fn client(settings: &Settings) -> Result<pr_pulse::devops::AzureDevOpsClient, PulseError> {
    let token = pr_pulse::credentials::require_token(settings.token.as_deref())?;
    pr_pulse::devops::create_client(token, settings.locator()?)
}

async fn run_stale(settings: &Settings) -> Result<(), PulseError> {
    let client = client(settings)?;
    let evaluator = pr_pulse::stale::StalenessEvaluator::new(settings.stale_threshold);
    let groups =
        pr_pulse::stale::StaleThreadReportBuilder::new(&client, evaluator, settings.fetch_timeout)
            .build(chrono::Utc::now())
            .await?;

    print!(
        "{}",
        pr_pulse::stale::render_report(&groups, client.locator())
    );
    Ok(())
}

async fn run_history(settings: &Settings, json: bool) -> Result<(), PulseError> {
    let client = client(settings)?;
    let summaries =
        pr_pulse::history::completed_time_spans(&client, settings.fetch_timeout).await?;

    if json {
        print_json(&summaries)
    } else {
        let use_colors = pr_pulse::output::should_use_colors();
        println!(
            "{}",
            pr_pulse::output::format_history_table(&summaries, use_colors)
        );
        Ok(())
    }
}

async fn run_switch(settings: &Settings, state: SwitchState) -> Result<(), PulseError> {
    let sink_settings = settings
        .sink
        .as_ref()
        .ok_or_else(|| PulseError::Configuration {
            message: format!("{} is not set", pr_pulse::config::ENV_SINK_ENDPOINT),
        })?;
    let sink = pr_pulse::notify::HttpNotificationSink::new(
        sink_settings.endpoint.clone(),
        sink_settings.token.clone(),
    )?;

    pr_pulse::notify::publish_switch(&sink, &settings.topics, state == SwitchState::On).await
}
