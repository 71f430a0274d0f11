mod demo;
mod import;
mod seed;

use clap::{Parser, Subcommand};
use common::env::Env;
use common::errors::AppError;
use sqlx::PgPool;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Fill the hub database with demo posts, comments and documents, or import
/// the parts catalogue.
#[derive(Parser, Debug)]
#[command(name = "seeder", version)]
struct Cli {
    /// Delete existing posts (and their comments) before seeding
    #[arg(long)]
    reset: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import remanufactured parts from a "MASTER - ENABLED" CSV export
    ImportProducts {
        /// Path to the CSV export
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let env = Env::from_env();
    common::tracing::init_for(env.is_production);

    if env.database_url.is_empty() {
        return Err(AppError::validation(
            "DATABASE_URL is not set, add it to the environment or a .env file",
        )
        .into());
    }

    match cli.command {
        Some(Command::ImportProducts { csv }) => import_products(&env, &csv).await,
        None => {
            let pool = common::db::create_pool(&env.database_url).await?;
            seed_demo(&pool, cli.reset).await
        }
    }
}

async fn seed_demo(pool: &PgPool, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    match seed::run(pool, reset).await? {
        seed::Outcome::Seeded(summary) => info!(
            posts = summary.posts,
            comments = summary.comments,
            documents = summary.documents,
            author = %summary.author,
            "Demo data seeded"
        ),
        seed::Outcome::Skipped { existing_posts } => warn!(
            existing_posts,
            "Posts already exist, rerun with --reset to replace them"
        ),
    }

    Ok(())
}

async fn import_products(env: &Env, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(AppError::validation(format!("File not found: {}", path.display())).into());
    }

    info!(path = %path.display(), "Reading remanufactured products");
    let parsed = import::parse_catalogue(File::open(path)?)?;

    info!(parsed = parsed.products.len(), "Parsed products");
    if parsed.missing_sku > 0 {
        warn!(rows = parsed.missing_sku, "Skipped rows without a SKU");
    }
    if parsed.duplicate_in_file > 0 {
        warn!(rows = parsed.duplicate_in_file, "Skipped repeated SKUs within the file");
    }

    let Some(sample) = parsed.products.first() else {
        warn!("No products found in the CSV");
        return Ok(());
    };
    info!(
        sku = %sample.sku,
        name = %sample.name,
        category = %sample.category,
        application = ?sample.application,
        price_cents = ?sample.unit_price,
        cost_cents = ?sample.unit_cost,
        margin_percent = ?sample
            .unit_price
            .zip(sample.unit_cost)
            .and_then(|(price, cost)| import::margin_percent(price, cost)),
        "Sample product"
    );

    let pool = common::db::create_pool(&env.database_url).await?;
    let summary = import::run(&pool, parsed.products).await?;

    if summary.imported == 0 {
        info!(skipped_existing = summary.skipped_existing, "No new products to import");
        return Ok(());
    }

    info!(
        imported = summary.imported,
        skipped_existing = summary.skipped_existing,
        with_price = summary.with_price,
        with_cost = summary.with_cost,
        average_price_cents = summary.average_price_cents,
        top_categories = ?summary.top_categories,
        "Product import complete"
    );

    Ok(())
}
