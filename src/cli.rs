//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Resolve a Liquipedia page URL into its rendered HTML and raw wikitext.
///
/// The page is looked up through the wiki API; with a cache directory the
/// content is stored per page id and reused on later runs.
#[derive(Parser, Debug)]
#[command(name = "liquipedia-fetch")]
#[command(author, version, about)]
pub struct Args {
    /// Page URL, e.g. https://liquipedia.net/dota2/Team_Liquid
    pub url: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file path (defaults to $XDG_CONFIG_HOME/liquipedia-fetch/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cache fetched content in this directory
    #[arg(long, value_name = "DIR", conflicts_with = "no_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Disable caching even if the config file sets `cache_dir`
    #[arg(long)]
    pub no_cache: bool,

    /// Print the content bundle as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Override the expected wiki origin
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,
}
