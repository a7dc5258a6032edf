//! Open Trivia Database client.
//!
//! One `GET {base_url}?amount=1&category={id}&type=multiple` per question.
//! The response looks like:
//!
//! ```json
//! {"response_code": 0,
//!  "results": [{"question": "Who was crowned Emperor of the French in 1804?",
//!               "correct_answer": "Napoleon",
//!               "incorrect_answers": ["Caesar", "Hannibal", "Alexander"]}]}
//! ```
//!
//! Text comes HTML-escaped (`&quot;`, `&#039;`, ...) and is decoded here so
//! the game only ever sees plain strings.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::categories::DEFAULT_CATEGORIES;
use crate::{FetchError, Question, QuestionProvider};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for [`OpenTdbProvider`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Endpoint URL, without query string.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Category name → provider category id.
    pub categories: Vec<(String, u32)>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opentdb.com/api.php".to_string(),
            timeout: Duration::from_secs(10),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, id)| ((*name).to_string(), *id))
                .collect(),
        }
    }
}

impl ProviderConfig {
    /// Lower bound for [`Self::timeout`].
    pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Clamp out-of-range values. Called by [`OpenTdbProvider::new`].
    pub fn validated(mut self) -> Self {
        if self.timeout < Self::MIN_TIMEOUT {
            tracing::warn!(
                timeout_ms = self.timeout.as_millis() as u64,
                "provider timeout below minimum, clamping"
            );
            self.timeout = Self::MIN_TIMEOUT;
        }
        self
    }

    /// Provider id for a category name, if configured.
    pub fn category_id(&self, name: &str) -> Option<u32> {
        self.categories
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<ApiQuestion>,
}

#[derive(Debug, Deserialize)]
struct ApiQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Turns a response body into a [`Question`].
pub(crate) fn parse_response(
    category: &str,
    body: &str,
) -> Result<Question, FetchError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(e.to_string()))?;

    if response.response_code != 0 {
        return Err(FetchError::NoResults(response.response_code));
    }
    let raw = response
        .results
        .into_iter()
        .next()
        .ok_or(FetchError::NoResults(response.response_code))?;

    Ok(Question {
        category: category.to_string(),
        text: decode(&raw.question),
        correct_answer: decode(&raw.correct_answer),
        incorrect_answers: raw
            .incorrect_answers
            .iter()
            .map(|a| decode(a))
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// [`QuestionProvider`] that queries the Open Trivia Database over HTTP.
#[derive(Debug, Clone)]
pub struct OpenTdbProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenTdbProvider {
    /// Builds the HTTP client.
    pub fn new(config: ProviderConfig) -> Result<Self, FetchError> {
        let config = config.validated();
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("trivia-room/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl QuestionProvider for OpenTdbProvider {
    async fn fetch(&self, category: &str) -> Result<Question, FetchError> {
        let id = self
            .config
            .category_id(category)
            .ok_or_else(|| FetchError::UnknownCategory(category.to_string()))?;
        let id = id.to_string();

        tracing::debug!(category, id = %id, "fetching trivia question");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("amount", "1"),
                ("category", id.as_str()),
                ("type", "multiple"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_response(category, &body)
    }
}
