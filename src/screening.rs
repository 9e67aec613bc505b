//! Requests ranked similar molecules from the screening backend. If the backend can't supply them
//! for any reason, we build simulated hits from the reference catalog instead.
//!
//! The backend takes `{"smiles": <query>}` by POST, and returns `{"hits": [Molecule, ...]}`,
//! already sorted by score.

use std::{io, io::ErrorKind, thread, time::Duration};

use log::{debug, warn};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::{
    Molecule, ReqError, ScreeningResult, catalog,
    config::Config,
    make_agent,
};

/// Upper bound (exclusive) of simulated scores for non-matching catalog entries.
const FALLBACK_SCORE_MAX: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Query structure is empty")]
    EmptyQuery,
}

#[derive(Serialize)]
struct ScreeningRequest<'a> {
    smiles: &'a str,
}

/// Makes the single remote attempt. Any error here means "use the fallback"; the kind of error
/// is only used for logging.
pub trait ScreeningTransport {
    fn request_hits(&self, smiles: &str) -> Result<ScreeningResult, ReqError>;
}

/// The screening backend, over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    pub url: String,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
        }
    }
}

impl ScreeningTransport for HttpTransport {
    fn request_hits(&self, smiles: &str) -> Result<ScreeningResult, ReqError> {
        let payload_json = serde_json::to_string(&ScreeningRequest { smiles })?;

        let agent = make_agent();

        let mut resp = agent
            .post(self.url.as_str())
            .header("Content-Type", "application/json")
            .send(&payload_json)?;

        if !resp.status().is_success() {
            return Err(ReqError::Status(resp.status().as_u16()));
        }

        let body = resp.body_mut().read_to_string()?;
        let parsed: ScreeningResult = serde_json::from_str(&body)?;

        if parsed.hits.iter().any(|h| !h.score.is_finite()) {
            return Err(ReqError::Io(io::Error::new(
                ErrorKind::InvalidData,
                "Non-finite similarity score",
            )));
        }

        Ok(parsed)
    }
}

/// What came back from the single remote attempt.
#[derive(Debug)]
pub enum RemoteOutcome {
    Hits(ScreeningResult),
    Failed(ReqError),
}

impl From<Result<ScreeningResult, ReqError>> for RemoteOutcome {
    fn from(res: Result<ScreeningResult, ReqError>) -> Self {
        match res {
            Ok(r) => Self::Hits(r),
            Err(e) => Self::Failed(e),
        }
    }
}

/// The one place we decide between remote hits and simulated ones. Remote hits are passed through
/// as-is; we trust the backend's ordering. On failure, this blocks for `delay` before returning
/// the simulated set.
pub fn resolve<R: Rng>(
    outcome: RemoteOutcome,
    query: &str,
    delay: Duration,
    rng: &mut R,
) -> ScreeningResult {
    match outcome {
        RemoteOutcome::Hits(result) => {
            if !result.is_sorted_desc() {
                debug!("Screening backend returned hits out of score order");
            }
            result
        }
        RemoteOutcome::Failed(e) => {
            warn!("Screening backend not reachable ({e}). Using simulated hits.");
            thread::sleep(delay);
            fallback_hits(query, rng)
        }
    }
}

/// Score every catalog molecule against the query: An exact SMILES match gets 1.0; everything
/// else gets a random score in [0, 0.5). Sorted, highest first.
pub fn fallback_hits<R: Rng>(query: &str, rng: &mut R) -> ScreeningResult {
    let hits = catalog::reference_mols()
        .into_iter()
        .map(|mol| {
            let score = if mol.smiles == query {
                1.
            } else {
                rng.random_range(0. ..FALLBACK_SCORE_MAX)
            };
            Molecule { score, ..mol }
        })
        .collect();

    let mut result = ScreeningResult { hits };
    result.sort_desc();
    result
}

/// Anything that can turn a query into ranked hits. An `Err` here is an unexpected failure, and is
/// shown to the user; transport failures never reach this level.
pub trait Screener {
    fn screen(&self, query: &str) -> Result<ScreeningResult, ScreenError>;
}

pub struct ScreeningClient<T: ScreeningTransport = HttpTransport> {
    transport: T,
    fallback_delay: Duration,
}

impl ScreeningClient {
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(HttpTransport::new(&cfg.screening_url), cfg.fallback_delay)
    }
}

impl Default for ScreeningClient {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<T: ScreeningTransport> ScreeningClient<T> {
    pub fn new(transport: T, fallback_delay: Duration) -> Self {
        Self {
            transport,
            fallback_delay,
        }
    }

    /// A single remote attempt, with no retry. Uses `rng` for simulated scores if it fails.
    /// The query is sent, and matched against the catalog, exactly as given.
    pub fn screen_with_rng<R: Rng>(
        &self,
        query: &str,
        rng: &mut R,
    ) -> Result<ScreeningResult, ScreenError> {
        if query.trim().is_empty() {
            return Err(ScreenError::EmptyQuery);
        }

        let outcome = self.transport.request_hits(query).into();
        Ok(resolve(outcome, query, self.fallback_delay, rng))
    }
}

impl<T: ScreeningTransport> Screener for ScreeningClient<T> {
    fn screen(&self, query: &str) -> Result<ScreeningResult, ScreenError> {
        self.screen_with_rng(query, &mut rand::rng())
    }
}
