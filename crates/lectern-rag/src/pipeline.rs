//! Notes pipeline: chunk, index, retrieve, answer

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use lectern_core::{
    Answer, AnswerClassifier, Embedder, Error, GenerationConfig, LLMProvider, MatchPolicy,
    PipelineConfig, PromptTemplate, RAGQuery, RAGResult, Result, Retriever,
};

use crate::chunker::TextChunker;
use crate::classifier::PhraseClassifier;
use crate::document_indexer::ChunkIndexer;
use crate::engine::TranscriptSession;
use crate::vector_store::SessionVectorStore;

/// Retrieval query used when generating notes for a whole transcript
pub const NOTES_INSTRUCTION: &str = "Generate lecture notes based on the above transcript.";

/// Transcript to notes, then grounded follow-up questions
///
/// The pipeline owns no index itself. Each call to [`generate_notes`] builds
/// a fresh [`TranscriptSession`] that the caller keeps for chat.
///
/// [`generate_notes`]: NotesPipeline::generate_notes
pub struct NotesPipeline<L: LLMProvider, E: Embedder, C: AnswerClassifier = PhraseClassifier> {
    llm: Arc<L>,
    embedder: Arc<E>,
    classifier: C,
    index_root: Option<PathBuf>,
}

impl<L: LLMProvider, E: Embedder + 'static> NotesPipeline<L, E, PhraseClassifier> {
    /// Pipeline with the built-in phrase classifier and its default policy
    pub fn new(llm: Arc<L>, embedder: Arc<E>) -> Result<Self> {
        Ok(Self {
            llm,
            embedder,
            classifier: PhraseClassifier::new(MatchPolicy::default())?,
            index_root: None,
        })
    }
}

impl<L: LLMProvider, E: Embedder + 'static, C: AnswerClassifier> NotesPipeline<L, E, C> {
    /// Swap the unanswered-answer detector
    pub fn with_classifier<C2: AnswerClassifier>(self, classifier: C2) -> NotesPipeline<L, E, C2> {
        NotesPipeline {
            llm: self.llm,
            embedder: self.embedder,
            classifier,
            index_root: self.index_root,
        }
    }

    /// Put session indexes under `root` instead of the system temp directory
    pub fn with_index_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.index_root = Some(root.into());
        self
    }

    fn generation_config(&self, temperature: Option<f32>) -> GenerationConfig {
        let config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            ..GenerationConfig::default()
        };

        match temperature {
            Some(t) => config.with_temperature(t),
            None => config,
        }
    }

    /// Chunk and index a transcript into a new session
    pub async fn build_session(
        &self,
        transcript: &str,
        config: &PipelineConfig,
    ) -> Result<TranscriptSession<E>> {
        config.validate()?;

        if transcript.trim().is_empty() {
            return Err(Error::InvalidInput("Transcript is empty".to_string()));
        }

        let chunker = TextChunker::from_config(config)?;
        let chunks = chunker.chunk(transcript);

        let store = Arc::new(match &self.index_root {
            Some(root) => SessionVectorStore::in_dir(root)?,
            None => SessionVectorStore::new()?,
        });
        let indexer = ChunkIndexer::new(self.embedder.clone(), store.clone());
        let indexed = indexer.index_chunks(&chunks).await?;

        info!(
            session_id = %store.session_id(),
            chunks = indexed.chunks_indexed,
            chunk_size = config.chunk_size,
            chunk_overlap = config.chunk_overlap,
            "Transcript session ready"
        );

        Ok(TranscriptSession::new(store, self.embedder.clone(), config.retriever_k))
    }

    /// Stuff the retrieved context into the template and call the model once
    pub async fn answer(
        &self,
        template: &PromptTemplate,
        retrieved: &RAGResult,
        question: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        let prompt = template.render(&retrieved.context, question);
        debug!(
            chunks = retrieved.chunks.len(),
            prompt_chars = prompt.chars().count(),
            "Answering from retrieved context"
        );

        let result = self
            .llm
            .generate_with_config(&prompt, &self.generation_config(temperature))
            .await?;

        Ok(result.text)
    }

    /// Index the transcript and generate notes with the caller's template
    ///
    /// Returns the notes together with the session, so follow-up questions
    /// reuse the same index. A failure after indexing closes the session.
    pub async fn generate_notes(
        &self,
        transcript: &str,
        template: &PromptTemplate,
        config: &PipelineConfig,
    ) -> Result<(String, TranscriptSession<E>)> {
        let session = self.build_session(transcript, config).await?;

        match self.notes_for(&session, template, config).await {
            Ok(notes) => {
                info!(session_id = %session.id(), notes_chars = notes.len(), "Generated notes");
                Ok((notes, session))
            }
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!(error = %close_err, "Failed to close session after error");
                }
                Err(e)
            }
        }
    }

    async fn notes_for(
        &self,
        session: &TranscriptSession<E>,
        template: &PromptTemplate,
        config: &PipelineConfig,
    ) -> Result<String> {
        let retrieved = session.retrieve_for(NOTES_INSTRUCTION).await?;
        self.answer(template, &retrieved, NOTES_INSTRUCTION, Some(config.llm_temperature))
            .await
    }

    /// Answer a question from the session, falling back to the bare model
    ///
    /// When the grounded answer reads as "not in the transcript", it is
    /// discarded and the model is asked the raw query with no context.
    pub async fn chat<R: Retriever>(&self, query: &str, retriever: &R) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Question is empty".to_string()));
        }

        let retrieved = retriever
            .retrieve(&RAGQuery {
                query: query.to_string(),
                top_k: retriever.top_k(),
            })
            .await?;

        let grounded = self
            .answer(&PromptTemplate::default_qa(), &retrieved, query, None)
            .await?;

        if !self.classifier.is_unanswered(&grounded) {
            return Ok(Answer::Grounded(grounded));
        }

        warn!(
            retrieved = retrieved.chunks.len(),
            "Transcript had no answer, using general model"
        );

        let general = self
            .llm
            .generate_with_config(query, &self.generation_config(None))
            .await?;

        Ok(Answer::Fallback(general.text))
    }
}
