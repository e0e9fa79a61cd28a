//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file located by priority:
//! 1. Command-line argument (highest priority)
//! 2. `MOODTUNES_CONFIG` environment variable
//! 3. Platform config file (`~/.config/moodtunes/config.toml`, ...)
//! 4. Compiled defaults (fallback)
//!
//! A missing file is never fatal: a warning is logged and defaults are used.
//! Individual values can then be overridden from the command line or
//! environment through [`ConfigOverrides`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MOODTUNES_CONFIG";

// ============================================================================
// Product variant
// ============================================================================

/// Which product surface the service presents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductVariant {
    /// Signed-in users walk mood -> artist -> songs; pricing and user menu shown
    #[default]
    Guided,
    /// Anyone submits a mood and gets curated recommendations
    Classic,
}

impl FromStr for ProductVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guided" => Ok(ProductVariant::Guided),
            "classic" => Ok(ProductVariant::Classic),
            other => Err(Error::Config(format!(
                "Unknown variant '{}' (expected 'guided' or 'classic')",
                other
            ))),
        }
    }
}

impl fmt::Display for ProductVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductVariant::Guided => f.write_str("guided"),
            ProductVariant::Classic => f.write_str("classic"),
        }
    }
}

// ============================================================================
// TOML schema
// ============================================================================

/// Bootstrap configuration loaded from TOML
///
/// Read once at startup; the service must restart to pick up changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    pub bind_addr: String,
    /// HTTP server port
    pub port: u16,
    pub variant: ProductVariant,
    pub logging: LoggingConfig,
    pub lookup: LookupConfig,
    pub billing: BillingConfig,
    pub session: SessionConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 5780,
            variant: ProductVariant::default(),
            logging: LoggingConfig::default(),
            lookup: LookupConfig::default(),
            billing: BillingConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Song search backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupBackend {
    /// Templated results after a fixed delay
    #[default]
    Mock,
    /// YouTube Data API v3 search
    Youtube,
}

/// Song lookup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub backend: LookupBackend,
    /// Artificial latency of the mock backend (and the curated
    /// recommendations), in milliseconds
    pub latency_ms: u64,
    /// Number of results requested per lookup
    pub result_count: usize,
    pub youtube_api_key: Option<String>,
    /// ISO 3166-1 alpha-2 region hint passed to YouTube
    pub youtube_region: Option<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            backend: LookupBackend::Mock,
            latency_ms: 1500,
            result_count: 5,
            youtube_api_key: None,
            youtube_region: None,
        }
    }
}

impl LookupConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Backend that will actually be used
    ///
    /// YouTube without a usable API key falls back to the mock backend.
    pub fn effective_backend(&self) -> LookupBackend {
        match self.backend {
            LookupBackend::Youtube if !self.has_youtube_key() => {
                warn!("lookup.backend = \"youtube\" but no API key configured; using mock backend");
                LookupBackend::Mock
            }
            backend => backend,
        }
    }

    fn has_youtube_key(&self) -> bool {
        self.youtube_api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Billing collaborator selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingBackend {
    /// In-process stand-in returning fixed redirect URLs
    #[default]
    Demo,
    /// Hosted billing functions (create-checkout, customer-portal, check-subscription)
    Functions,
}

/// Billing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub backend: BillingBackend,
    /// Base URL of the hosted billing functions
    pub functions_url: Option<String>,
    /// Key sent as bearer token to the billing functions
    pub api_key: Option<String>,
    /// Redirect returned by the demo backend for checkout
    pub demo_checkout_url: String,
    /// Redirect returned by the demo backend for the customer portal
    pub demo_portal_url: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            backend: BillingBackend::Demo,
            functions_url: None,
            api_key: None,
            demo_checkout_url: "/subscription-success".to_string(),
            demo_portal_url: "/pricing".to_string(),
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "mt_session".to_string(),
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Values supplied on the command line or through the environment
///
/// Each `Some` replaces the corresponding TOML value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub variant: Option<ProductVariant>,
    pub log_level: Option<String>,
    pub youtube_api_key: Option<String>,
}

impl TomlConfig {
    /// Apply command-line / environment overrides on top of file values
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_addr) = overrides.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(variant) = overrides.variant {
            self.variant = variant;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(key) = overrides.youtube_api_key {
            self.lookup.youtube_api_key = Some(key);
        }
    }

    /// Socket address string for the HTTP listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// ============================================================================
// Loading and writing
// ============================================================================

/// Locate the config file following the priority order in the module docs
///
/// Returns `None` when neither an explicit path nor a platform file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    platform_config_candidates()
        .into_iter()
        .find(|candidate| candidate.exists())
}

/// Platform config file locations, most specific first
fn platform_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("moodtunes").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/moodtunes/config.toml"));
    }

    candidates
}

/// Load configuration from `path`, falling back to defaults
///
/// - `None` or a missing file: warning + compiled defaults
/// - unreadable or malformed file: `Error::Config`
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config file found; using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} does not exist; using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write configuration to `path` atomically
///
/// Serializes to a sibling temp file and renames it over the target, so a
/// reader never sees a half-written file.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}
