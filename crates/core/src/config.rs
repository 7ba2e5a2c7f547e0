use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::FileFormat;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Models advertised by `/api/limits`.
pub const SUPPORTED_AI_MODELS: &[&str] = &[
    "anthropic/claude-3.5-sonnet",
    "anthropic/claude-3-opus",
    "openai/gpt-4-turbo",
    "openai/gpt-4o",
    "google/gemini-pro-1.5",
];

const DEFAULT_SUPPORTED_FORMATS: &[&str] = &["step", "stp", "stl"];

/// Source of raw settings. The process environment in production, a map in tests.
trait Lookup {
    fn opt(&self, key: &str) -> Option<String>;

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.opt(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn list_or(&self, key: &str, default: &[&str]) -> Vec<String> {
        let parsed: Vec<String> = self
            .opt(key)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if parsed.is_empty() {
            default.iter().map(|s| s.to_string()).collect()
        } else {
            parsed
        }
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn opt(&self, key: &str) -> Option<String> {
        self(key).filter(|s| !s.is_empty())
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Process-wide settings, read once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub ai: AiConfig,
    pub timeouts: TimeoutConfig,
    pub scratch: ScratchConfig,
    pub attribution: AttributionConfig,
    pub debug: bool,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self::from_lookup(|key: &str| env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let attribution = AttributionConfig::from_lookup(&lookup);
        Self {
            server: ServerConfig::from_lookup(&lookup),
            limits: LimitsConfig::from_lookup(&lookup),
            ai: AiConfig::from_lookup(&lookup, &attribution),
            timeouts: TimeoutConfig::from_lookup(&lookup),
            scratch: ScratchConfig::from_lookup(&lookup),
            debug: lookup.or("DEBUG", "false").eq_ignore_ascii_case("true"),
            attribution,
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:   {}:{}, cors={}", self.server.host, self.server.port, self.server.cors_origins.join(","));
        tracing::info!("  limits:   max={}MB, formats={}", self.limits.max_file_size_mb, self.limits.supported_formats.join(","));
        tracing::info!(
            "  ai:       default_model={}, server_key={}",
            self.ai.default_model,
            if self.ai.openrouter_api_key.is_some() { "set" } else { "unset" }
        );
        tracing::info!(
            "  timeouts: probe={}s, download={}s, ai={}s, bom={}s",
            self.timeouts.probe_secs,
            self.timeouts.download_secs,
            self.timeouts.ai_secs,
            self.timeouts.bom_secs
        );
        tracing::info!("  scratch:  {}", self.scratch.dir.display());
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_: &str| None)
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    fn from_lookup(l: &impl Lookup) -> Self {
        Self {
            host: l.or("HOST", "0.0.0.0"),
            port: l.opt("PORT").and_then(|v| v.trim().parse().ok()).unwrap_or(8080),
            cors_origins: l.list_or("CORS_ORIGINS", &["*"]),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

// ── Limits ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_file_size_mb: u64,
    pub supported_formats: Vec<String>,
}

impl LimitsConfig {
    fn from_lookup(l: &impl Lookup) -> Self {
        Self {
            max_file_size_mb: l.u64_or("MAX_FILE_SIZE_MB", 100),
            supported_formats: l
                .list_or("SUPPORTED_FORMATS", DEFAULT_SUPPORTED_FORMATS)
                .into_iter()
                .map(|f| f.to_ascii_lowercase())
                .collect(),
        }
    }

    /// The cap in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn exceeds(&self, bytes: u64) -> bool {
        bytes > self.max_file_size()
    }

    /// Whether the deployment accepts this format for conversion.
    pub fn accepts(&self, format: FileFormat) -> bool {
        self.supported_formats.iter().any(|f| f == format.extension())
    }
}

// ── AI (OpenRouter) ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub default_model: String,
    pub supported_models: Vec<String>,
    #[serde(skip_serializing)]
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    /// Sent as `HTTP-Referer` for OpenRouter attribution.
    pub site_url: String,
    pub app_title: String,
}

impl AiConfig {
    fn from_lookup(l: &impl Lookup, attribution: &AttributionConfig) -> Self {
        let default_site = format!(
            "https://github.com/{}/{}",
            attribution.github_username, attribution.github_repo
        );
        Self {
            default_model: l.or("DEFAULT_AI_MODEL", "anthropic/claude-3.5-sonnet"),
            supported_models: SUPPORTED_AI_MODELS.iter().map(|m| m.to_string()).collect(),
            openrouter_api_key: l.opt("OPENROUTER_API_KEY"),
            openrouter_base_url: l
                .or("OPENROUTER_BASE_URL", "https://openrouter.ai/api")
                .trim_end_matches('/')
                .to_string(),
            site_url: l.or("SITE_URL", &default_site),
            app_title: l.or("APP_TITLE", "CAD Converter"),
        }
    }

    /// A key supplied with the request wins over the server-side key.
    pub fn resolve_api_key(&self, request_key: Option<&str>) -> Option<String> {
        request_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.openrouter_api_key.clone())
    }

    pub fn resolve_model(&self, request_model: Option<&str>) -> String {
        request_model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str())
            .to_string()
    }
}

// ── Timeouts ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub probe_secs: u64,
    pub download_secs: u64,
    pub ai_secs: u64,
    pub bom_secs: u64,
}

impl TimeoutConfig {
    fn from_lookup(l: &impl Lookup) -> Self {
        Self {
            probe_secs: l.u64_or("PROBE_TIMEOUT", 10),
            download_secs: l.u64_or("DOWNLOAD_TIMEOUT", 120),
            ai_secs: l.u64_or("AI_TIMEOUT", 60),
            bom_secs: l.u64_or("BOM_TIMEOUT", 120),
        }
    }

    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn ai(&self) -> Duration {
        Duration::from_secs(self.ai_secs)
    }

    pub fn bom(&self) -> Duration {
        Duration::from_secs(self.bom_secs)
    }
}

// ── Scratch storage ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchConfig {
    pub dir: PathBuf,
}

impl ScratchConfig {
    fn from_lookup(l: &impl Lookup) -> Self {
        Self {
            dir: l.opt("SCRATCH_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir),
        }
    }
}

// ── Attribution ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    pub authors: String,
    pub github_username: String,
    pub github_repo: String,
}

impl AttributionConfig {
    fn from_lookup(l: &impl Lookup) -> Self {
        Self {
            authors: l.or("PROJECT_AUTHORS", "Josh Ayokhai, River"),
            github_username: l.or("GITHUB_USERNAME", "ajokhai"),
            github_repo: l.or("GITHUB_REPO", "cad-converter"),
        }
    }

    pub fn repository_url(&self) -> String {
        format!("https://github.com/{}/{}", self.github_username, self.github_repo)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.allows_any_origin());
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.limits.max_file_size(), 100 * 1024 * 1024);
        assert_eq!(config.limits.supported_formats, vec!["step", "stp", "stl"]);
        assert_eq!(config.ai.default_model, "anthropic/claude-3.5-sonnet");
        assert_eq!(config.ai.site_url, "https://github.com/ajokhai/cad-converter");
        assert_eq!(config.timeouts.probe(), Duration::from_secs(10));
        assert_eq!(config.timeouts.download(), Duration::from_secs(120));
        assert_eq!(config.timeouts.ai(), Duration::from_secs(60));
        assert_eq!(config.timeouts.bom(), Duration::from_secs(120));
        assert!(!config.debug);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_with(&[
            ("MAX_FILE_SIZE_MB", "5"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("SUPPORTED_FORMATS", "STL"),
            ("GITHUB_USERNAME", "someone"),
            ("DEBUG", "TRUE"),
        ]);
        assert_eq!(config.limits.max_file_size(), 5 * 1024 * 1024);
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.server.allows_any_origin());
        assert!(config.limits.accepts(FileFormat::Stl));
        assert!(!config.limits.accepts(FileFormat::Step));
        assert_eq!(config.ai.site_url, "https://github.com/someone/cad-converter");
        assert!(config.debug);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let config = config_with(&[("MAX_FILE_SIZE_MB", "lots"), ("PORT", "-1")]);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn size_cap_is_inclusive() {
        let config = config_with(&[("MAX_FILE_SIZE_MB", "1")]);
        assert!(!config.limits.exceeds(1024 * 1024));
        assert!(config.limits.exceeds(1024 * 1024 + 1));
    }

    #[test]
    fn huge_size_cap_saturates() {
        let config = config_with(&[("MAX_FILE_SIZE_MB", "18446744073709551615")]);
        assert_eq!(config.limits.max_file_size(), u64::MAX);
        assert!(!config.limits.exceeds(u64::MAX));
    }

    #[test]
    fn request_key_wins_over_server_key() {
        let config = config_with(&[("OPENROUTER_API_KEY", "server-key")]);
        assert_eq!(config.ai.resolve_api_key(Some("user-key")).as_deref(), Some("user-key"));
        assert_eq!(config.ai.resolve_api_key(Some("  ")).as_deref(), Some("server-key"));
        assert_eq!(config.ai.resolve_api_key(None).as_deref(), Some("server-key"));
        assert_eq!(Config::default().ai.resolve_api_key(None), None);
    }
}
