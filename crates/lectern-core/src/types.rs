//! Common types used across Lectern

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder replaced by the retrieved context
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced by the question or instruction
pub const QUESTION_PLACEHOLDER: &str = "{question}";

const DEFAULT_QA_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
\n\
{context}\n\
\n\
Question: {question}\n\
Helpful Answer:";

/// A contiguous span of source text
///
/// `start` and `end` are character offsets into the source, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    /// Number of characters in the chunk
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Instruction string with a `{context}` slot and an optional `{question}` slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template, rejecting one without a `{context}` slot
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(CONTEXT_PLACEHOLDER) {
            return Err(Error::InvalidInput(format!(
                "Prompt template must contain {}",
                CONTEXT_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// The question-answering prompt used when the caller supplies none
    pub fn default_qa() -> Self {
        Self {
            template: DEFAULT_QA_TEMPLATE.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn has_question(&self) -> bool {
        self.template.contains(QUESTION_PLACEHOLDER)
    }

    /// Fill both slots in one pass; inserted text is never rescanned
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .split(CONTEXT_PLACEHOLDER)
            .map(|piece| piece.replace(QUESTION_PLACEHOLDER, question))
            .collect::<Vec<_>>()
            .join(context)
    }
}

/// Tunable parameters of the notes pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retriever_k: usize,
    pub llm_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            retriever_k: 5,
            llm_temperature: crate::llm::DEFAULT_TEMPERATURE,
        }
    }
}

impl PipelineConfig {
    /// Check every parameter range before any provider is called
    pub fn validate(&self) -> Result<()> {
        validate_chunking(self.chunk_size, self.chunk_overlap)?;

        if self.retriever_k == 0 {
            return Err(Error::Configuration(
                "retriever_k must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.llm_temperature) {
            return Err(Error::Configuration(format!(
                "llm_temperature must be within [0, 1], got {}",
                self.llm_temperature
            )));
        }

        Ok(())
    }
}

/// Check chunk size and overlap
pub fn validate_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::Configuration(
            "chunk_size must be greater than 0".to_string(),
        ));
    }

    if chunk_overlap >= chunk_size {
        return Err(Error::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }

    Ok(())
}
