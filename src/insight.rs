//! A short, generated description of a molecule, from a text-generation API.
//! [API docs](https://ai.google.dev/api/generate-content)
//!
//! This never fails from the caller's point of view: a missing credential, or a failed call,
//! produce placeholder text instead.

use log::error;
use serde::{Deserialize, Serialize};

use crate::{ReqError, config::Config, make_agent};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const NO_API_KEY_TEXT: &str = "API Key not configured. Unable to fetch AI analysis.";
pub const FAILED_TEXT: &str = "Failed to analyze molecule.";
pub const EMPTY_TEXT: &str = "No analysis available.";

/// Anything that can describe a molecule given its name and SMILES.
pub trait Summarizer {
    fn summarize(&self, name: &str, smiles: &str) -> String;
}

/// A single-turn text-generation call.
pub trait TextGenerator {
    fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ReqError>;
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Default, Deserialize)]
struct RespPart {
    #[serde(default)]
    text: String,
}

#[derive(Default, Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: RespContent,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first candidate. May be empty.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini's `generateContent` endpoint.
#[derive(Clone, Debug)]
pub struct GeminiBackend {
    pub base_url: String,
    pub model: String,
}

impl GeminiBackend {
    pub fn new(model: &str) -> Self {
        Self {
            base_url: BASE_URL.to_owned(),
            model: model.to_owned(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

impl TextGenerator for GeminiBackend {
    fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ReqError> {
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let payload_json = serde_json::to_string(&payload)?;

        let agent = make_agent();

        let mut resp = agent
            .post(self.url().as_str())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", api_key)
            .send(&payload_json)?;

        if !resp.status().is_success() {
            return Err(ReqError::Status(resp.status().as_u16()));
        }

        let body = resp.body_mut().read_to_string()?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        Ok(parsed.text())
    }
}

pub fn build_prompt(name: &str, smiles: &str) -> String {
    format!(
        "Analyze the following molecule for a pharmaceutical context:\n\
         Name: {name}\n\
         SMILES: {smiles}\n\n\
         Provide a concise 2-sentence summary covering its primary therapeutic use (if known) \
         or chemical class, and one potential biological target."
    )
}

/// No caching: every call to `summarize` makes a new request.
pub struct InsightClient<G: TextGenerator = GeminiBackend> {
    api_key: Option<String>,
    backend: G,
}

impl InsightClient {
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.api_key.clone(), GeminiBackend::new(&cfg.insight_model))
    }
}

impl<G: TextGenerator> InsightClient<G> {
    pub fn new(api_key: Option<String>, backend: G) -> Self {
        Self { api_key, backend }
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }
}

impl<G: TextGenerator> Summarizer for InsightClient<G> {
    fn summarize(&self, name: &str, smiles: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return NO_API_KEY_TEXT.to_owned();
        };

        match self.backend.generate(api_key, &build_prompt(name, smiles)) {
            Ok(text) if text.trim().is_empty() => EMPTY_TEXT.to_owned(),
            Ok(text) => text,
            Err(e) => {
                error!("Text generation API error: {e}");
                FAILED_TEXT.to_owned()
            }
        }
    }
}
