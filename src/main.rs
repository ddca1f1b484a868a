use std::sync::Arc;

use clap::Parser;
use tracing::error;

use fia_sync::apis::{ElasticEventSearch, FirstSeasonsApi, HubSpotClient};
use fia_sync::config::Config;
use fia_sync::sync::{SyncReport, SyncRunner};
use fia_sync::{logging, secrets};

#[derive(Parser)]
#[command(name = "fia_sync")]
#[command(about = "FIRST in Alabama marketing event sync")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

fn print_report(report: &SyncReport) {
    for outcome in &report.programs {
        println!(
            "\n📊 {} ({} season):",
            outcome.program.as_str(),
            outcome.season_year
        );
        if let Some(reason) = &outcome.skipped {
            println!("   ⚠️  Skipped: {}", reason);
            continue;
        }
        println!("   Fetched: {}", outcome.fetched);
        println!("   Dropped: {}", outcome.dropped);
        println!("   Updates: {}", outcome.updates);
        println!("   Creates: {}", outcome.creates);
        if outcome.ambiguous > 0 {
            println!("   ⚠️  Ambiguous matches: {}", outcome.ambiguous);
        }
        if let Some(reason) = &outcome.error {
            println!("   ❌ {}", reason);
        } else if outcome.submitted {
            println!("   ✅ Batch submitted");
        } else {
            println!("   Nothing to submit");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    println!("🔄 Sync begin");

    let config = Config::load(&cli.config)?;

    let token = match secrets::load_api_token(&config.token_path) {
        Ok(token) => token,
        Err(e) => {
            error!("could not load API token: {}", e);
            println!("❌ Could not retrieve HubSpot API token: {e}");
            std::process::exit(1);
        }
    };

    let runner = SyncRunner::new(
        Arc::new(FirstSeasonsApi::new(&config)?),
        Arc::new(ElasticEventSearch::new(&config)?),
        Arc::new(HubSpotClient::new(&config, token)?),
    );

    match runner.run().await {
        Ok(report) => {
            print_report(&report);
            println!("\n✅ Sync complete");
        }
        Err(e) => {
            error!("sync run failed: {}", e);
            println!("❌ Sync failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}
