#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for Vigia Cidadã.
//!
//! ```text
//! vigia                          # interactive app
//! vigia serve [--interactive]    # HTTP API
//! vigia ranking [--uf MG] [--city "Belo Horizonte"] [--json]
//! vigia regions [--json]
//! ```
//!
//! The interactive app uses `indicatif-log-bridge` (via
//! [`vigia_cli_utils::init_logger`]) so log lines and spinners never fight
//! for the terminal.

mod app;
mod render;
mod screens;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use vigia_ai::analysis::{analyst_from_env, line_ranking_or_empty, regional_risk_or_empty};
use vigia_flow::geolocation::geolocator_from_env;
use vigia_report_models::insights::{DEFAULT_CITY, DEFAULT_UF};
use vigia_storage::sqlite::{SqliteStore, db_path_from_env};

#[derive(Parser)]
#[command(
    name = "vigia",
    about = "Report public-transport incidents in Belo Horizonte"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Prompt for bind address, port and database path first
        #[arg(long)]
        interactive: bool,
    },
    /// Print the lines with the most complaints
    Ranking {
        /// State abbreviation
        #[arg(long, default_value = DEFAULT_UF)]
        uf: String,
        /// City name
        #[arg(long, default_value = DEFAULT_CITY)]
        city: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Print complaint volume and risk per region
    Regions {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::Serve { interactive }) = cli.command {
        // The server uses actix-web's runtime and sets up its own logger,
        // so run it on a blocking task to avoid nesting tokio runtimes.
        tokio::task::spawn_blocking(move || {
            actix_web::rt::System::new().block_on(async move {
                if interactive {
                    vigia_server::interactive::run().await
                } else {
                    vigia_server::run_server().await
                }
            })
        })
        .await??;
        return Ok(());
    }

    let multi = vigia_cli_utils::init_logger();
    let analyst = analyst_from_env();

    match cli.command {
        Some(Commands::Ranking { uf, city, json }) => {
            let bar = vigia_cli_utils::spinner(&multi, "Consultando ranking...");
            let ranking = line_ranking_or_empty(analyst.as_ref(), &uf, &city).await;
            bar.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
            } else {
                println!("{}", render::ranking_table(&ranking));
            }
        }
        Some(Commands::Regions { json }) => {
            let bar = vigia_cli_utils::spinner(&multi, "Analisando regionais...");
            let risk = regional_risk_or_empty(analyst.as_ref()).await;
            bar.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&risk)?);
            } else {
                println!("{}", render::regions_table(&risk));
            }
        }
        Some(Commands::Serve { .. }) | None => {
            let db_path = db_path_from_env();
            log::info!("Opening store at {}", db_path.display());
            let store = SqliteStore::open(&db_path).await?;

            let services = app::Services::new(
                analyst,
                geolocator_from_env(),
                Arc::new(store),
                multi,
            );
            app::App::new(services).run().await?;
        }
    }

    Ok(())
}
