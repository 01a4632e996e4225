use crate::tmdb::TMDB_BASE;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const REQUIRED_ENV: [&str; 1] = ["TMDB_API_KEY"];

const DEFAULT_ADDR: &str = "0.0.0.0:3147";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_BLUR_GRACE_MS: u64 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub addr: SocketAddr,
    pub search_debounce: Duration,
    pub blur_grace: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = get("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        let tmdb_base_url = get("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string());
        let addr = get("CINEDECK_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("CINEDECK_ADDR is not a socket address")?;
        let search_debounce = millis(get("SEARCH_DEBOUNCE_MS"), DEFAULT_SEARCH_DEBOUNCE_MS)
            .context("SEARCH_DEBOUNCE_MS must be a whole number of milliseconds")?;
        let blur_grace = millis(get("SEARCH_BLUR_GRACE_MS"), DEFAULT_BLUR_GRACE_MS)
            .context("SEARCH_BLUR_GRACE_MS must be a whole number of milliseconds")?;

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            addr,
            search_debounce,
            blur_grace,
        })
    }
}

fn millis(raw: Option<String>, default: u64) -> Result<Duration> {
    let ms = match raw {
        Some(v) => v.trim().parse::<u64>()?,
        None => default,
    };
    Ok(Duration::from_millis(ms))
}
