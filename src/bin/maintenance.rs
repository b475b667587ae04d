//! Operational tasks run against the live database: duplicate cleanup and seeding.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenv::dotenv;

use siteops::database::{DocumentStore, MongoStore, Repository};
use siteops::seeds;
use siteops::services::dedupe_service::{self, DedupeSummary};

#[derive(Parser)]
#[command(name = "siteops-maintenance", version, about = "SiteOps database maintenance")]
struct Cli {
    /// MongoDB URI, defaults to $DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove leads sharing the same phone number, keeping the oldest
    DedupeLeads {
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove repeated attendance marks for the same worker and day, keeping the first
    DedupeAttendance {
        #[arg(long)]
        dry_run: bool,
    },
    /// Insert demo projects and workers, and optionally an admin account
    Seed {
        #[arg(long, requires = "admin_password")]
        admin_email: Option<String>,
        #[arg(long, requires = "admin_email")]
        admin_password: Option<String>,
        /// Skip the demo projects and workers
        #[arg(long)]
        no_demo: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = match cli.database_url {
        Some(url) => url,
        None => env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set or passed with --database-url")?,
    };

    let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::connect(&database_url).await?);
    log::info!("✅ MongoDB connected");

    match cli.command {
        Command::DedupeLeads { dry_run } => {
            let summary = dedupe_service::dedupe_leads(&Repository::new(store), dry_run).await?;
            report("leads", &summary);
        }
        Command::DedupeAttendance { dry_run } => {
            let summary = dedupe_service::dedupe_attendance(&Repository::new(store), dry_run).await?;
            report("attendance", &summary);
        }
        Command::Seed { admin_email, admin_password, no_demo } => {
            if !no_demo {
                seeds::seed_demo_data(store.clone()).await?;
            }
            if let (Some(email), Some(password)) = (admin_email, admin_password) {
                seeds::seed_admin(store, &email, &password).await?;
            }
        }
    }

    Ok(())
}

fn report(collection: &str, summary: &DedupeSummary) {
    let verb = if summary.dry_run { "would remove" } else { "removed" };
    println!(
        "{}: scanned {}, {} duplicate groups, {} {} records",
        collection,
        summary.scanned,
        summary.duplicate_groups,
        verb,
        summary.removed.len()
    );
}
