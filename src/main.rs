use anyhow::{Context, Result};
use clap::Parser;
use geo_ref::cli::{read_password, Args};
use geo_ref::db::{close_pool, open_pool, DbPool, PgFactTable, PgMasterTable, PgReferenceTable};
use geo_ref::writer::REFERENCE_TABLE;
use geo_ref::{GeoRefJob, RunReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Validation happens here, before any connection is opened.
    let job = GeoRefJob::new(args.configuration()?)?;

    let settings = args.connection_settings(read_password)?;
    let pool = open_pool(&settings, "fact").await?;
    let result = run_with_pool(&job, &args, &pool).await;
    close_pool(&pool, "fact").await;
    let report = result?;

    println!(
        "Inserted {} rows into {} ({} distinct locations, {} unmatched)",
        report.rows_inserted, REFERENCE_TABLE, report.distinct_locations, report.missed
    );
    if args.report_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing run report")?
        );
    }

    Ok(())
}

/// Fact and destination share `pool`; the master database gets its own
/// connection for the lifetime of the run.
async fn run_with_pool(job: &GeoRefJob, args: &Args, pool: &DbPool) -> Result<RunReport> {
    let master_pool = open_pool(&args.master_settings(), "master").await?;

    let fact = PgFactTable::new(pool.clone());
    let destination = PgReferenceTable::new(pool.clone());
    let master = PgMasterTable::new(master_pool.clone());

    info!("Resolving locations for {}", job.config().fact_table());
    let result = job.run(&fact, &master, &destination).await;
    close_pool(&master_pool, "master").await;

    Ok(result?)
}
