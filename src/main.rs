//! CLI entry point for liquipedia-fetch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use liquipedia_core::{ContentBundle, FsCacheStore, Scraper};
use tracing::{debug, info};

mod app_config;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries the result.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_config(args.config.as_deref())?;
    let service_config = file_config.service_config(args.origin.as_deref());
    let mut scraper = Scraper::new(service_config).context("Failed to initialize HTTP client")?;
    debug!(config = ?scraper.config(), "service configuration resolved");

    let cache_dir = if args.no_cache {
        None
    } else {
        args.cache_dir.or(file_config.cache_dir)
    };
    if let Some(dir) = cache_dir {
        let store = FsCacheStore::new(dir);
        info!(cache_dir = %store.dir().display(), "page cache enabled");
        scraper = scraper.with_cache(Arc::new(store));
    }

    let bundle = scraper
        .scrape(&args.url)
        .await
        .with_context(|| format!("Failed to fetch '{}'", args.url))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_summary(&bundle);
    }

    Ok(())
}

fn print_summary(bundle: &ContentBundle) {
    println!("game:      {}", bundle.game_namespace);
    println!("page id:   {}", bundle.page_id);
    println!("rendered:  {} bytes", bundle.rendered_markup.len());
    println!("wikitext:  {} bytes", bundle.raw_markup.len());
}
