mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tenk_steps_client::config::Config;
use tenk_steps_client::http_client::ReqwestStepsClient;

#[derive(Parser)]
#[command(name = "tenksteps")]
#[command(about = "Step logging and leaderboards for the 10,000 Steps UK member site")]
#[command(version)]
struct Cli {
    /// Log every request and response to stderr
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the activity types the site tracks besides walking
    Activities,
    /// Show the full walk history, one total per day
    History,
    /// Show the individual and team leaderboards
    Leaders,
    /// Log a step count
    Add {
        /// Number of steps to record
        #[arg(allow_negative_numbers = true)]
        steps: i64,
        /// Date to record against, as YYYY-MM-DD (default: yesterday)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Remove every step log for a date
    Delete {
        /// Date to clear, as YYYY-MM-DD (default: yesterday)
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config_path = Config::default_path()?;
    if !config_path.exists() {
        Config::write_template(&config_path)?;
        println!(
            "Missing {}. A template has been created for editing.",
            config_path.display()
        );
        return Ok(());
    }
    let config = Config::load(&config_path)?;
    tracing::debug!(path = %config_path.display(), "loaded credentials");

    let client = ReqwestStepsClient::new(&config.base_url);
    client
        .login(&config.username, &config.password)
        .await
        .context("logging in")?;

    let report = match cli.command {
        Command::Activities => commands::activities(&client).await?,
        Command::History => commands::history(&client).await?,
        Command::Leaders => commands::leaders(&client).await?,
        Command::Add { steps, date } => {
            let date = date.unwrap_or_else(commands::yesterday);
            commands::add(&client, steps, &date).await?
        }
        Command::Delete { date } => {
            let date = date.unwrap_or_else(commands::yesterday);
            commands::delete(&client, &date).await?
        }
    };
    print!("{report}");
    Ok(())
}

/// Configure logging from `TENKSTEPS_LOG` (or fallback to `RUST_LOG`,
/// default `warn`). `--debug` overrides both. Reports go to stdout, so the
/// subscriber writes to stderr to keep them separable.
fn init_tracing(debug: bool) {
    let log_env = if debug {
        "debug".to_string()
    } else {
        std::env::var("TENKSTEPS_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string())
    };
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}
