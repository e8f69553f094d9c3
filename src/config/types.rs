use serde::Deserialize;

/// Main configuration structure for Sitemap Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harvest: HarvestConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
    pub patterns: PatternConfig,
}

/// Harvest behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of worker tasks pulling URLs from the dispatcher
    pub workers: u32,

    /// Longest match written to the results, in bytes; longer matches are truncated
    #[serde(rename = "max-match-length")]
    pub max_match_length: usize,

    /// Suffix that marks a `<loc>` value as a nested sitemap document
    #[serde(rename = "sitemap-suffix")]
    pub sitemap_suffix: String,

    /// Also print every match to stdout
    #[serde(rename = "echo-matches")]
    pub echo_matches: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_match_length: 255,
            sitemap_suffix: crate::url::DEFAULT_SITEMAP_SUFFIX.to_string(),
            echo_matches: true,
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("sitemap-harvester/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the intermediate leaf-URL list
    #[serde(rename = "urls-path")]
    pub urls_path: String,

    /// Directory receiving `emails.txt` or `phones.txt`
    #[serde(rename = "output-dir")]
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            urls_path: "urls.txt".to_string(),
            output_dir: ".".to_string(),
        }
    }
}

/// Optional overrides for the built-in patterns
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Replaces the built-in email pattern
    pub email: Option<String>,

    /// Replaces the built-in phone pattern
    pub phone: Option<String>,

    /// Replaces the `<loc>` pattern used to scan sitemap documents
    pub loc: Option<String>,
}
