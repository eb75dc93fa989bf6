use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing/validation logic is decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let nearest_url = require("NEAREST_API_URL")?;
    let search_url = require("SEARCH_API_URL")?;

    let issuer_url = lookup("DASHBOARD_ISSUER_URL").ok();
    let audience = lookup("DASHBOARD_AUDIENCE").ok();
    let public_key_path =
        PathBuf::from(or_default("MARKETFIYAT_PUBLIC_KEY_PATH", "public_key.pem"));

    let log_level = or_default("MARKETFIYAT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("MARKETFIYAT_REQUEST_TIMEOUT_SECS", "30")?;
    let search_page_size = parse_u32("MARKETFIYAT_SEARCH_PAGE_SIZE", "20")?;

    Ok(AppConfig {
        nearest_url,
        search_url,
        issuer_url,
        audience,
        public_key_path,
        log_level,
        request_timeout_secs,
        search_page_size,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with all required env vars populated with valid defaults.
    fn full_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("NEAREST_API_URL", "https://api.example.com/nearest");
        m.insert("SEARCH_API_URL", "https://api.example.com/search");
        m
    }

    #[test]
    fn build_app_config_fails_without_nearest_url() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "NEAREST_API_URL"),
            "expected MissingEnvVar(NEAREST_API_URL), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_without_search_url() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("NEAREST_API_URL", "https://api.example.com/nearest");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "SEARCH_API_URL"),
            "expected MissingEnvVar(SEARCH_API_URL), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_succeeds_with_defaults() {
        let map = full_env();
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.nearest_url, "https://api.example.com/nearest");
        assert_eq!(cfg.search_url, "https://api.example.com/search");
        assert!(cfg.issuer_url.is_none());
        assert!(cfg.audience.is_none());
        assert_eq!(cfg.public_key_path.to_str(), Some("public_key.pem"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.search_page_size, 20);
    }

    #[test]
    fn build_app_config_reads_auth_settings() {
        let mut map = full_env();
        map.insert("DASHBOARD_ISSUER_URL", "http://dashboard:8050");
        map.insert("DASHBOARD_AUDIENCE", "marketfiyat-mcp");
        map.insert("MARKETFIYAT_PUBLIC_KEY_PATH", "/etc/keys/dashboard.pem");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.issuer_url.as_deref(), Some("http://dashboard:8050"));
        assert_eq!(cfg.audience.as_deref(), Some("marketfiyat-mcp"));
        assert_eq!(cfg.public_key_path.to_str(), Some("/etc/keys/dashboard.pem"));
    }

    #[test]
    fn build_app_config_timeout_override() {
        let mut map = full_env();
        map.insert("MARKETFIYAT_REQUEST_TIMEOUT_SECS", "60");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
        assert_eq!(cfg.request_timeout_secs, 60);
    }

    #[test]
    fn build_app_config_timeout_invalid() {
        let mut map = full_env();
        map.insert("MARKETFIYAT_REQUEST_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "MARKETFIYAT_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(MARKETFIYAT_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_page_size_invalid() {
        let mut map = full_env();
        map.insert("MARKETFIYAT_SEARCH_PAGE_SIZE", "-3");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "MARKETFIYAT_SEARCH_PAGE_SIZE"),
            "expected InvalidEnvVar(MARKETFIYAT_SEARCH_PAGE_SIZE), got: {result:?}"
        );
    }
}
