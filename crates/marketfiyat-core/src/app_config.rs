use std::path::PathBuf;

/// Process-wide configuration for the price aggregation service.
///
/// Everything here is sourced from the environment; listen host/port and
/// transport selection belong to the server binary's CLI instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Endpoint returning stores near a coordinate.
    pub nearest_url: String,
    /// Endpoint searching product prices across a depot set.
    pub search_url: String,
    /// Expected `iss` claim for bearer tokens, when auth is configured.
    pub issuer_url: Option<String>,
    /// Expected `aud` claim for bearer tokens, when auth is configured.
    pub audience: Option<String>,
    /// PEM file holding the RS256 public key used to verify tokens.
    pub public_key_path: PathBuf,
    pub log_level: String,
    /// Uniform timeout applied to every outbound upstream call.
    pub request_timeout_secs: u64,
    /// Page cap sent with each product search request.
    pub search_page_size: u32,
}
