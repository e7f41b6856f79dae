//! Application configuration loaded from environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use perma_core::Whitelist;

use crate::auth::Principal;
use crate::flags::Rollout;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8082").
    pub bind_addr: String,

    /// Public origin of this service, used in Memento `Link` headers.
    /// e.g., "https://perma.cc"
    pub base_url: String,

    /// Prefix of the WARC/WACZ replay sources embedded in playback pages.
    pub replay_base_url: String,

    /// Path to the SQLite link database. `None` serves from an empty in-memory store.
    pub link_db_path: Option<PathBuf>,

    /// One whitelist per expected proxy hop, furthest proxy first.
    pub trusted_proxies: Vec<Whitelist>,

    /// Rollout of WACZ playback.
    pub wacz_playback: Rollout,

    /// Bearer tokens and the principals they authenticate.
    pub api_tokens: HashMap<String, Principal>,

    /// Port for the Prometheus exporter, if enabled.
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `PERMA_BIND_ADDR`: Server bind address (default: "0.0.0.0:8082")
    /// - `PERMA_BASE_URL`: Public origin (default: "http://localhost:8082")
    /// - `PERMA_REPLAY_BASE_URL`: Replay source prefix (default: "{base_url}/replay")
    /// - `PERMA_LINK_DB_PATH`: SQLite link database
    /// - `PERMA_TRUSTED_PROXIES`: Whitelists separated by `;`, ranges by `,`; `*` accepts any hop
    /// - `PERMA_WACZ_PLAYBACK`: `on`, `off` or `staff` (default: "off")
    /// - `PERMA_API_TOKENS`: Comma-separated `token:user_id[:staff]` entries
    /// - `PERMA_METRICS_PORT`: Prometheus exporter port
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("PERMA_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8082".to_string());

        let base_url = std::env::var("PERMA_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8082".to_string())
            .trim_end_matches('/')
            .to_string();

        let replay_base_url = std::env::var("PERMA_REPLAY_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("{base_url}/replay"));

        let link_db_path = std::env::var("PERMA_LINK_DB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let trusted_proxies = parse_trusted_proxies(
            &std::env::var("PERMA_TRUSTED_PROXIES").unwrap_or_default(),
        )?;

        let wacz_playback = match std::env::var("PERMA_WACZ_PLAYBACK") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("invalid PERMA_WACZ_PLAYBACK value '{value}'"))?,
            Err(_) => Rollout::Off,
        };

        let api_tokens = parse_api_tokens(&std::env::var("PERMA_API_TOKENS").unwrap_or_default())?;

        let metrics_port = std::env::var("PERMA_METRICS_PORT")
            .ok()
            .map(|port| {
                port.parse::<u16>()
                    .with_context(|| format!("invalid PERMA_METRICS_PORT value '{port}'"))
            })
            .transpose()?;

        tracing::info!(
            bind_addr = %bind_addr,
            base_url = %base_url,
            replay_base_url = %replay_base_url,
            link_db = ?link_db_path,
            proxy_hops = trusted_proxies.len(),
            wacz_playback = ?wacz_playback,
            token_count = api_tokens.len(),
            metrics_port = ?metrics_port,
            "playback configuration loaded"
        );

        Ok(Self {
            bind_addr,
            base_url,
            replay_base_url,
            link_db_path,
            trusted_proxies,
            wacz_playback,
            api_tokens,
            metrics_port,
        })
    }
}

/// Parse `PERMA_TRUSTED_PROXIES`: whitelists separated by `;`.
fn parse_trusted_proxies(value: &str) -> anyhow::Result<Vec<Whitelist>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }

    value
        .split(';')
        .map(|spec| {
            Whitelist::parse(spec)
                .with_context(|| format!("invalid trusted proxy whitelist '{}'", spec.trim()))
        })
        .collect()
}

/// Parse `PERMA_API_TOKENS`: comma-separated `token:user_id[:staff]` entries.
fn parse_api_tokens(value: &str) -> anyhow::Result<HashMap<String, Principal>> {
    let mut tokens = HashMap::new();

    for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut parts = entry.split(':');
        let token = parts.next().unwrap_or_default();
        let user_id = parts
            .next()
            .and_then(|id| id.parse::<i64>().ok())
            .with_context(|| format!("token entry for '{token}' needs a numeric user id"))?;
        let is_staff = match parts.next() {
            None => false,
            Some("staff") => true,
            Some(other) => anyhow::bail!("unknown token role '{other}'"),
        };

        if token.is_empty() {
            anyhow::bail!("empty token in PERMA_API_TOKENS");
        }

        tokens.insert(token.to_string(), Principal::user(user_id, is_staff));
    }

    Ok(tokens)
}
