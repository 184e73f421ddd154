use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
}

/// What the scraper knows about the target website's markup.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Title the site serves for unknown fund ids.
    #[serde(default = "default_not_found_title")]
    pub not_found_title: String,

    /// Class of the element holding the value converted to EUR.
    #[serde(default = "default_converted_value_class")]
    pub converted_value_class: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// Process name killed before every launch.
    #[serde(default = "default_process_name")]
    pub process_name: String,

    #[serde(default = "default_true")]
    pub headless: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_host() -> String {
    "www.quantalys.com".to_string()
}
fn default_not_found_title() -> String {
    "Page introuvable".to_string()
}
fn default_converted_value_class() -> String {
    "converted-value".to_string()
}
fn default_process_name() -> String {
    if cfg!(windows) {
        "chrome.exe".to_string()
    } else {
        "chrome".to_string()
    }
}
fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            not_found_title: default_not_found_title(),
            converted_value_class: default_converted_value_class(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            process_name: default_process_name(),
            headless: true,
        }
    }
}

impl SiteConfig {
    /// Page URL for one fund id. The id is used verbatim.
    pub fn fund_url(&self, fund_id: &str) -> String {
        format!("https://{}/Fonds/{}", self.host.trim_end_matches('/'), fund_id)
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("FUND_SCRAPER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration sources")?;

        cfg.try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
