mod report;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::services::{
    extract_listing_urls, DataLoaderService, HomescoreConfig, LoadResult, Ranker, WatchOptions,
    WatchService,
};
use crate::sources::open_source;

/// Apartment listing scorer and live ranking dashboard
#[derive(Parser)]
#[command(name = "homescore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Listing source: a JSON file, a directory of JSON files, or an http(s) URL
    #[arg(long, short, global = true, env = "HOMESCORE_SOURCE")]
    source: Option<String>,

    /// Config file (default: ~/.homescore/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui,

    /// Print listings ranked by score
    Rank {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show only the top N listings
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show every criterion of one listing
    Show {
        /// Listing id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-rank and print whenever the listings change
    Watch {
        /// Show only the top N listings
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,
    },

    /// Extract listing URLs from saved dashboard HTML pages
    Urls {
        /// HTML files to scan
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Base URL for relative links (overrides config)
        #[arg(long)]
        base_url: Option<String>,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let is_tui = matches!(self.command, None | Some(Commands::Tui));
        // The TUI owns the terminal; logging to stderr would corrupt it
        if !is_tui {
            init_logging(self.verbose);
        }

        let config = self.load_config()?;

        match self.command {
            None | Some(Commands::Tui) => {
                let loader = build_loader(&config)?;
                crate::tui::run(loader, WatchOptions::from(&config))
            }
            Some(Commands::Rank { json, limit }) => {
                let result = build_loader(&config)?.load()?;
                let shown = limit.unwrap_or(result.ranked.len()).min(result.ranked.len());
                if json {
                    println!("{}", serde_json::to_string_pretty(&result.ranked[..shown])?);
                } else {
                    print!("{}", report::render_summary(&result.summary));
                    println!();
                    print!("{}", report::render_table(&result.ranked, limit));
                }
                Ok(())
            }
            Some(Commands::Show { id, json }) => {
                let result = build_loader(&config)?.load()?;
                let Some(entry) = Ranker::find(&result.ranked, &id) else {
                    bail!("no listing with id {}", id);
                };
                if json {
                    println!("{}", serde_json::to_string_pretty(entry)?);
                } else {
                    println!("#{} of {}", entry.rank, result.ranked.len());
                    print!("{}", report::render_card(&entry.card));
                }
                Ok(())
            }
            Some(Commands::Watch { limit }) => run_watch(&config, limit),
            Some(Commands::Urls {
                files,
                json,
                base_url,
            }) => {
                let base_url = base_url.unwrap_or_else(|| config.base_url.clone());
                let mut urls = Vec::new();
                for file in &files {
                    let html = fs::read_to_string(file)
                        .with_context(|| format!("cannot read {}", file.display()))?;
                    urls.extend(extract_listing_urls(&html, &base_url));
                }
                urls.sort();
                urls.dedup();

                if json {
                    println!("{}", serde_json::to_string_pretty(&urls)?);
                } else {
                    for url in &urls {
                        println!("{}", url);
                    }
                }
                tracing::info!(count = urls.len(), "listing urls extracted");
                Ok(())
            }
        }
    }

    /// Config file merged with command-line overrides
    fn load_config(&self) -> anyhow::Result<HomescoreConfig> {
        let mut config = match &self.config {
            Some(path) => HomescoreConfig::load_from(path)?,
            None => HomescoreConfig::load()?,
        };
        if let Some(source) = &self.source {
            config.source = Some(source.clone());
        }
        Ok(config)
    }
}

fn build_loader(config: &HomescoreConfig) -> anyhow::Result<DataLoaderService> {
    let Some(location) = config.source.as_deref() else {
        bail!("no listing source: pass --source, set HOMESCORE_SOURCE, or add \"source\" to the config file");
    };
    let source = open_source(location, config.request_timeout())?;
    Ok(DataLoaderService::new(Arc::from(source)))
}

fn run_watch(config: &HomescoreConfig, limit: usize) -> anyhow::Result<()> {
    let loader = build_loader(config)?;
    print_ranking(&loader.load()?, limit);

    let (_handle, events) =
        WatchService::new(loader.source_handle(), WatchOptions::from(config)).spawn()?;

    for event in events {
        tracing::debug!(?event, "update event");
        match loader.load() {
            Ok(result) => print_ranking(&result, limit),
            // Keep watching; the next event retries
            Err(e) => tracing::error!(error = %e, "reload failed"),
        }
    }
    Ok(())
}

fn print_ranking(result: &LoadResult, limit: usize) {
    println!("── {} ──", result.loaded_at.format("%H:%M:%S"));
    print!("{}", report::render_table(&result.ranked, Some(limit)));
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "homescore=debug,info"
    } else {
        "homescore=info,warn"
    };
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
