//! Question provider adapter for the trivia room.
//!
//! The game asks for "a question in category X" and gets back a
//! [`Question`] with plain (HTML-decoded) text, or a [`FetchError`]. It
//! never retries: one failed fetch abandons the round.
//!
//! # Key types
//!
//! - [`QuestionProvider`]: the trait the game depends on
//! - [`OpenTdbProvider`]: implementation backed by the Open Trivia Database
//! - [`ProviderConfig`]: endpoint, timeout and category id table

mod categories;
mod error;
mod opentdb;

pub use categories::{DEFAULT_CATEGORIES, default_category_names};
pub use error::FetchError;
pub use opentdb::{OpenTdbProvider, ProviderConfig};

/// A multiple-choice question, with every string already HTML-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The category name the question was requested for.
    pub category: String,
    pub text: String,
    pub correct_answer: String,
    /// Wrong choices in provider order. Shuffling is the game's business.
    pub incorrect_answers: Vec<String>,
}

/// Source of trivia questions.
///
/// Object-safe (via `async_trait`) so the game can hold an
/// `Arc<dyn QuestionProvider>` and fetch from a spawned task.
#[async_trait::async_trait]
pub trait QuestionProvider: Send + Sync + 'static {
    /// Fetches one question for the named category.
    ///
    /// # Errors
    /// A category the provider has no id for is a configuration error and
    /// comes back as [`FetchError::UnknownCategory`], never as "no question".
    async fn fetch(&self, category: &str) -> Result<Question, FetchError>;
}
