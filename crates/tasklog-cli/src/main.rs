use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod dispatch;

#[derive(Parser)]
#[command(name = "tasklog")]
#[command(about = "View and download task instance logs", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/tasklog/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a page of a task instance log
    View {
        /// Task instance ID
        task_instance_id: i64,

        /// Project the task instance is expected to belong to
        #[arg(short, long)]
        project: Option<i64>,

        /// Lines to skip; the header is only printed when 0
        #[arg(short, long, default_value = "0")]
        skip: usize,

        /// Maximum number of lines
        #[arg(short, long, default_value = "1000")]
        limit: usize,

        /// Calling user
        #[arg(short, long)]
        user: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Download a whole task instance log
    Download {
        /// Task instance ID
        task_instance_id: i64,

        /// Project the task instance is expected to belong to
        #[arg(short, long)]
        project: Option<i64>,

        /// Calling user
        #[arg(short, long)]
        user: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or initialize the config file
    Config {
        /// Print the config path only
        #[arg(long)]
        path: bool,

        /// Write a sample config and catalog
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    use Commands::*;

    match cli.command {
        View {
            task_instance_id,
            project,
            skip,
            limit,
            user,
            json,
        } => {
            let (config, config_path) = dispatch::load_config(cli.config.as_deref())?;
            let catalog = dispatch::load_catalog(&config, &config_path)?;
            let user = dispatch::resolve_user(&catalog, &user);
            let service = dispatch::create_service(&config, catalog)?;
            commands::view::run(&service, &user, task_instance_id, project, skip, limit, json)
                .await?;
        }
        Download {
            task_instance_id,
            project,
            user,
            output,
        } => {
            let (config, config_path) = dispatch::load_config(cli.config.as_deref())?;
            let catalog = dispatch::load_catalog(&config, &config_path)?;
            let user = dispatch::resolve_user(&catalog, &user);
            let service = dispatch::create_service(&config, catalog)?;
            commands::download::run(&service, &user, task_instance_id, project, output.as_deref())
                .await?;
        }
        Config { path, init } => {
            let config_path = cli.config.unwrap_or_else(tasklog_core::Config::default_path);
            commands::config::run(&config_path, path, init).await?;
        }
    }

    Ok(())
}
