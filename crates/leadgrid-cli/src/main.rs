//! Operator CLI: run a search from a terminal, or export stored leads.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use leadgrid_core::{SearchCriteria, SearchMode};
use leadgrid_db::LeadFilter;
use leadgrid_export::{write_workbook, ExportRow};
use leadgrid_pipeline::{RunnerOptions, SearchRunner};
use leadgrid_places::PlacesClient;

#[derive(Debug, Parser)]
#[command(name = "leadgrid")]
#[command(about = "Lead generation over a places search API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a search and print the resulting leads as JSON.
    Search {
        /// City to sweep; repeat for multiple cities.
        #[arg(long, required = true)]
        city: Vec<String>,
        #[arg(long, default_value = "SP")]
        state: String,
        /// Raw keyword; repeat for multiple keywords.
        #[arg(long)]
        keyword: Vec<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long)]
        max_results: Option<u32>,
        /// Search mode: text, nearby, or grid.
        #[arg(long, default_value = "text")]
        mode: String,
        #[arg(long)]
        radius_m: Option<u32>,
        #[arg(long)]
        grid_points: Option<u32>,
        /// Also upsert the results into the database.
        #[arg(long)]
        persist: bool,
    },
    /// Export stored leads to an XLSX file.
    Export {
        /// Output path, e.g. ./leads.xlsx
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            city,
            state,
            keyword,
            neighborhood,
            max_results,
            mode,
            radius_m,
            grid_points,
            persist,
        } => {
            let mode = SearchMode::from_knobs(Some(&mode), radius_m, grid_points)
                .map_err(|unknown| anyhow::anyhow!("unknown search mode '{unknown}'"))?;
            search(city, state, keyword, neighborhood, max_results, mode, persist).await
        }
        Commands::Export {
            out,
            city,
            neighborhood,
        } => export(out, city, neighborhood).await,
    }
}

async fn search(
    cities: Vec<String>,
    state: String,
    keywords: Vec<String>,
    neighborhood: Option<String>,
    max_results: Option<u32>,
    mode: SearchMode,
    persist: bool,
) -> anyhow::Result<()> {
    let config = leadgrid_core::load_app_config()?;
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .context("GOOGLE_MAPS_API_KEY is not configured")?;

    let criteria = SearchCriteria::new(
        Some(state),
        cities,
        neighborhood,
        keywords,
        max_results,
        None,
        mode,
    )?;

    let places = PlacesClient::new(api_key, config.places_timeout_secs)?
        .token_retry(config.page_token_attempts, config.page_token_delay_ms)
        .transient_retry(config.places_max_retries, config.places_backoff_base_ms);
    let runner = SearchRunner::with_options(
        places,
        RunnerOptions {
            inter_query_delay_ms: config.inter_query_delay_ms,
        },
    );

    let outcome = runner.run(&criteria).await?;
    println!("{}", serde_json::to_string_pretty(&outcome.leads)?);
    eprintln!(
        "{} leads from {} unique candidates ({} terms)",
        outcome.leads.len(),
        outcome.unique_candidates,
        outcome.terms.len()
    );

    if persist {
        let pool = leadgrid_db::connect_pool_from_env().await?;
        leadgrid_db::run_migrations(&pool).await?;
        let summary = leadgrid_db::upsert_leads(&pool, &outcome.leads).await?;
        eprintln!(
            "persisted: {} inserted, {} updated, {} skipped",
            summary.inserted, summary.updated, summary.skipped
        );
    }

    Ok(())
}

async fn export(
    out: PathBuf,
    city: Option<String>,
    neighborhood: Option<String>,
) -> anyhow::Result<()> {
    let pool = leadgrid_db::connect_pool_from_env().await?;
    let rows = leadgrid_db::list_leads(
        &pool,
        &LeadFilter {
            city,
            neighborhood,
            name: None,
        },
    )
    .await?;

    let export_rows: Vec<ExportRow> = rows
        .iter()
        .map(|row| ExportRow {
            name: row.name.clone(),
            city: row.city.clone(),
            neighborhood: row.neighborhood.clone(),
            address: row.address.clone(),
            postal_code: row.postal_code.clone().unwrap_or_default(),
            area_code: row.area_code.clone().unwrap_or_default(),
            phone: row.phone.clone().unwrap_or_default(),
            website: row.website.clone().unwrap_or_default(),
        })
        .collect();

    let bytes = write_workbook(&export_rows)?;
    std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
    eprintln!("wrote {} rows to {}", export_rows.len(), out.display());

    Ok(())
}
