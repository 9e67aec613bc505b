//! Runtime settings. The only value read from the environment is the insight API credential.

use std::{env, time::Duration};

pub const SCREENING_URL: &str = "http://localhost:8000/calculate-similarity";

/// How long to wait before returning simulated hits, so the loading state stays visible.
pub const FALLBACK_DELAY: Duration = Duration::from_millis(800);

pub const INSIGHT_MODEL: &str = "gemini-3-flash-preview";

/// Checked in order.
const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Clone, Debug)]
pub struct Config {
    pub screening_url: String,
    pub fallback_delay: Duration,
    pub insight_model: String,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screening_url: SCREENING_URL.to_owned(),
            fallback_delay: FALLBACK_DELAY,
            insight_model: INSIGHT_MODEL.to_owned(),
            api_key: None,
        }
    }
}

impl Config {
    /// Defaults, with the API key taken from the environment if set.
    pub fn from_env() -> Self {
        Self {
            api_key: api_key_from(|var| env::var(var).ok()),
            ..Default::default()
        }
    }
}

/// A blank value counts as unset.
fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|&var| lookup(var))
        .map(|v| v.trim().to_owned())
        .find(|v| !v.is_empty())
}
