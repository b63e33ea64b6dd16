//! Retrieval and answer types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, ScoredChunk};

/// Notice placed before answers produced without retrieval context
pub const FALLBACK_NOTICE: &str =
    "Note: The requested information was not found in the provided document. Hence, the general chatbot was used.";

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGQuery {
    pub query: String,
    pub top_k: usize,
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGResult {
    pub chunks: Vec<ScoredChunk>,
    pub context: String,
}

/// A bound handle onto one transcript's index
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve the most similar chunks for a query
    async fn retrieve(&self, query: &RAGQuery) -> Result<RAGResult>;

    /// Join retrieved chunks into one context block, verbatim
    fn build_context(&self, chunks: &[ScoredChunk]) -> String {
        chunks
            .iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of chunks requested per retrieval
    fn top_k(&self) -> usize;

    /// Get statistics about the index behind this handle
    async fn stats(&self) -> Result<serde_json::Value>;

    /// Check if the handle can still serve retrievals
    fn is_ready(&self) -> bool;
}

/// Answer returned by the notes pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Answer {
    /// Produced from retrieved transcript context
    Grounded(String),
    /// Produced by the model alone after the grounded answer was judged unhelpful
    Fallback(String),
}

impl Answer {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Answer::Fallback(_))
    }

    /// Raw model output, without any notice
    pub fn content(&self) -> &str {
        match self {
            Answer::Grounded(text) | Answer::Fallback(text) => text,
        }
    }

    /// Text shown to the user; fallback answers carry the notice
    pub fn render(&self) -> String {
        match self {
            Answer::Grounded(text) => text.clone(),
            Answer::Fallback(text) => format!("\n{}\n\n{}\n", FALLBACK_NOTICE, text),
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// How a phrase is compared against an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Phrase appears anywhere in the answer
    #[default]
    Substring,
    /// Phrase appears bounded by word boundaries
    WholeWord,
    /// Trimmed answer equals the phrase
    Exact,
}

impl MatchPolicy {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<MatchPolicy> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "substring" | "contains" => Some(MatchPolicy::Substring),
            "whole_word" | "word" => Some(MatchPolicy::WholeWord),
            "exact" => Some(MatchPolicy::Exact),
            _ => None,
        }
    }
}

/// Decides whether a grounded answer says the transcript had nothing on the question
pub trait AnswerClassifier: Send + Sync {
    fn is_unanswered(&self, answer: &str) -> bool;
}

impl<F> AnswerClassifier for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_unanswered(&self, answer: &str) -> bool {
        self(answer)
    }
}
