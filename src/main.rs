mod cli;

use anyhow::{Context, Result};
use bondwatch::config::Config;
use bondwatch::db;
use bondwatch::pipeline::ScrapePipeline;
use bondwatch::reports;
use bondwatch::scheduler::SchedulerHandle;
use bondwatch::web::WebServer;
use chrono::Utc;
use clap::Parser;
use cli::{formatters, Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    match cli.command {
        Commands::Serve { port, no_schedule } => {
            if let Some(port) = port {
                config.listen_port = port;
            }
            handle_serve(config, no_schedule).await
        }
        Commands::Scrape { from_file } => handle_scrape(&config, from_file.as_deref()).await,
        Commands::Report { json } => handle_report(&config, json),
        Commands::Samples { isin } => handle_samples(&config, isin.as_deref()),
    }
}

/// Scheduler plus web server until Ctrl-C
async fn handle_serve(config: Config, no_schedule: bool) -> Result<()> {
    let pipeline = Arc::new(ScrapePipeline::new(&config)?);

    let scheduler = if no_schedule {
        info!("Scheduled scraping disabled");
        None
    } else {
        Some(SchedulerHandle::start(config.schedule()?, pipeline.clone()).await?)
    };

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server started at http://localhost:{}", config.listen_port);

    let served = WebServer::new(pipeline.db_path().to_path_buf())
        .serve_with_shutdown(listener, shutdown_signal())
        .await;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await?;
    }

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// One cycle, from the network or from saved markup
async fn handle_scrape(config: &Config, from_file: Option<&Path>) -> Result<()> {
    let pipeline = ScrapePipeline::new(config)?;

    let (report, source) = match from_file {
        Some(path) => {
            info!("Ingesting saved listing from: {:?}", path);
            let markup = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let report = pipeline.ingest(&markup, Utc::now())?;
            (report, path.display().to_string())
        }
        None => {
            let report = pipeline.run_cycle().await?;
            (report, pipeline.source_url().to_string())
        }
    };

    print!("{}", formatters::format_cycle_report(&report, &source));
    Ok(())
}

fn handle_report(config: &Config, json: bool) -> Result<()> {
    let db_path = config.database_path()?;
    db::init_database(&db_path)?;
    let payload = reports::load_chart(&db_path)?;

    if json {
        println!("{}", formatters::format_chart_json(&payload));
    } else if payload.is_empty() {
        print!("{}", formatters::format_empty_history());
    } else {
        print!("{}", formatters::format_chart_summary(&payload));
    }
    Ok(())
}

fn handle_samples(config: &Config, isin: Option<&str>) -> Result<()> {
    let db_path = config.database_path()?;
    db::init_database(&db_path)?;
    let conn = db::open_db(&db_path)?;

    let samples = match isin {
        Some(isin) => db::list_samples_for_isin(&conn, isin)?,
        None => db::list_samples(&conn)?,
    };

    if samples.is_empty() {
        print!("{}", formatters::format_empty_history());
    } else {
        print!("{}", formatters::format_samples_table(&samples));
    }
    Ok(())
}
