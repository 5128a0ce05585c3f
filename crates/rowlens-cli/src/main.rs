use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rowlens_core::RowlensConfig;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rowlens", version, about = "rowlens table viewer")]
struct Cli {
    /// Path to the configuration file.
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "ROWLENS_CONFIG",
        default_value = "rowlens.yaml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the dashboard and viewer endpoints.
    Serve {
        /// Serve the built-in sample tables instead of connecting to Postgres.
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Override `dashboard.host`.
        #[arg(long)]
        host: Option<String>,

        /// Override `dashboard.port`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the allow-listed tables with their row counts and embed snippets.
    Tables {
        #[arg(long, default_value_t = false)]
        demo: bool,

        /// Print JSON (tables, columns and counts) instead of a listing.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print one page of a table.
    Show {
        /// Table to show. Defaults to `viewer.default_table`.
        table: Option<String>,

        #[arg(long, default_value_t = false)]
        demo: bool,

        #[arg(long)]
        page: Option<i64>,

        #[arg(long)]
        per_page: Option<i64>,

        /// Case-insensitive substring matched against every column.
        #[arg(long)]
        search: Option<String>,

        /// Column to sort by.
        #[arg(long)]
        orderby: Option<String>,

        /// Sort direction (`ASC` or `DESC`).
        #[arg(long)]
        order: Option<String>,
    },

    /// Page through a table interactively.
    Browse {
        table: Option<String>,

        #[arg(long, default_value_t = false)]
        demo: bool,
    },

    /// Capture the allow-listed tables and their columns from Postgres as JSON.
    Snapshot {
        /// Write the snapshot to a file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the configuration file.
    Check,
}

/// Filter directive: `RUST_LOG` wins, then `logging.level` from the config.
fn env_filter(config_path: &std::path::Path) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = RowlensConfig::from_file(config_path)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string());
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&cli.config))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Serve { demo, host, port } => {
            commands::serve::run(&cli.config, demo, host, port).await?;
        }
        Command::Tables { demo, json } => {
            commands::tables::run(&cli.config, demo, json).await?;
        }
        Command::Show {
            table,
            demo,
            page,
            per_page,
            search,
            orderby,
            order,
        } => {
            let args = commands::show::ShowArgs {
                table,
                page,
                per_page,
                search,
                orderby,
                order,
            };
            commands::show::run(&cli.config, demo, args).await?;
        }
        Command::Browse { table, demo } => {
            commands::browse::run(&cli.config, demo, table).await?;
        }
        Command::Snapshot { out } => {
            commands::snapshot::run(&cli.config, out.as_deref()).await?;
        }
        Command::Check => {
            commands::check::run(&cli.config)?;
        }
    }

    Ok(())
}
