//! Deterministic providers for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lectern_core::{
    Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

/// Hashes each lower-cased word into one of DIMENSION buckets
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub const DIMENSION: usize = 64;

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; Self::DIMENSION];
        let lower = text.to_lowercase();
        for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            // FNV-1a
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % Self::DIMENSION as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }

    fn model_id(&self) -> &str {
        "bag-of-words"
    }
}

/// Returns one embedding fewer than asked for
pub struct ShortEmbedder;

#[async_trait]
impl Embedder for ShortEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![1.0]; texts.len().saturating_sub(1)])
    }

    fn model_id(&self) -> &str {
        "short"
    }
}

/// Always fails, like an unreachable embedding endpoint
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::Network("connection refused".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// LLM whose reply is computed from the prompt; records every call
pub struct ScriptedLlm {
    respond: Responder,
    prompts: Mutex<Vec<String>>,
    temperatures: Mutex<Vec<Option<f32>>>,
}

impl ScriptedLlm {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
            temperatures: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same text to every prompt
    pub fn constant(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn temperatures(&self) -> Vec<Option<f32>> {
        self.temperatures.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        self.generate_with_config(prompt, &GenerationConfig::default()).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut temperatures) = self.temperatures.lock() {
            temperatures.push(config.temperature);
        }

        let text = (self.respond)(prompt)?;
        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used: None,
        })
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}
