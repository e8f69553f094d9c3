//! Sitemap Harvester: a sitemap-driven contact harvester
//!
//! This crate resolves a site's sitemap tree into a flat list of page URLs,
//! then fetches every page and scans it for email addresses or phone numbers.
//! The fetch phase runs either sequentially or on a pool of workers that pull
//! tasks from a single dispatcher.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid mode '{0}'. Use -email or -phone.")]
    InvalidMode(String),

    #[error("Failed to compile pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        source: regex::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Sitemap Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, RunShape};
pub use extract::{ExtractMode, ExtractionEngine};
pub use state::WorkerState;
pub use url::SitemapNode;
