//! pomo: command-line Pomodoro timer.
//!
//! ## Subcommands
//!
//! - `start`: run a session in the foreground, or detach it with `--background`
//! - `view`: completed-session history, most recent first
//! - `stop`: terminate the background timer recorded in the PID file
//! - `timer-child`: background timer process (spawned internally, hidden)

mod history;
mod launcher;
mod logging;
mod stop;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use pomo_core::{PomoConfig, DEFAULT_SESSION_MINUTES};

#[derive(Parser)]
#[command(name = "pomo")]
#[command(about = "Pomodoro timer with a local session history")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a work session
    Start {
        /// The name of the task to work on
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        task: String,

        /// Session length in minutes
        #[arg(long, default_value_t = DEFAULT_SESSION_MINUTES)]
        time: u32,

        /// Run the timer in the background and return immediately
        #[arg(long)]
        background: bool,
    },

    /// Show completed sessions, most recent first
    View {
        /// Print one JSON object per session instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Stop the background timer
    Stop,

    /// Background timer process (spawned by `start --background`)
    #[command(name = "timer-child", hide = true)]
    TimerChild {
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        task: String,

        #[arg(long)]
        time: u32,
    },
}

fn main() {
    let logging_guard = logging::init();
    let cli = Cli::parse();

    let config = match PomoConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Failed to resolve pomo data directory");
            drop(logging_guard);
            std::process::exit(1);
        }
    };
    tracing::debug!(root = %config.root().display(), "Using pomo data directory");

    let result = match cli.command {
        Commands::Start {
            task,
            time,
            background: false,
        } => launcher::run_foreground(&config, &task, time).map(|_| ()),
        Commands::Start {
            task,
            time,
            background: true,
        } => launcher::spawn_background(&config, &task, time).map(|_| ()),
        Commands::TimerChild { task, time } => {
            launcher::run_background_child(&config, &task, time)
        }
        Commands::View { json } => {
            let format = if json {
                history::Format::Json
            } else {
                history::Format::Text
            };
            history::run(&config, format)
        }
        Commands::Stop => stop::run(&config),
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "pomo failed");
        drop(logging_guard);
        std::process::exit(1);
    }
}
