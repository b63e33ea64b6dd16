//! Snapshot and scenario tests for the notes pipeline

#[cfg(test)]
mod snapshot_tests {
    use std::sync::Arc;

    use insta::assert_yaml_snapshot;
    use lectern_core::{Answer, Error, PipelineConfig, PromptTemplate, Retriever, FALLBACK_NOTICE};

    use crate::testing::{BagOfWordsEmbedder, ScriptedLlm};
    use crate::{chunk_text, NotesPipeline};

    const QA_MARKER: &str = "Helpful Answer:";

    #[test]
    fn test_chunks_snapshot() {
        let chunks = chunk_text("The sun is a star. It is very hot.", 16, 4).unwrap();

        assert_yaml_snapshot!(chunks, @r###"
        ---
        - index: 0
          text: The sun is a sta
          start: 0
          end: 16
        - index: 1
          text: " star. It is ver"
          start: 12
          end: 28
        - index: 2
          text: " very hot."
          start: 24
          end: 34
        "###);
    }

    #[tokio::test]
    async fn test_sun_question_is_grounded() {
        let llm = Arc::new(ScriptedLlm::new(|prompt| {
            if prompt.contains("star") && prompt.contains("hot") {
                Ok("The sun is a star, and it is very hot.".to_string())
            } else {
                Ok("I don't know.".to_string())
            }
        }));
        let pipeline = NotesPipeline::new(llm.clone(), Arc::new(BagOfWordsEmbedder::default())).unwrap();
        let session = pipeline
            .build_session("The sun is a star. It is very hot.", &PipelineConfig::default())
            .await
            .unwrap();

        let answer = pipeline.chat("What is the sun?", &session).await.unwrap();

        assert_eq!(answer, Answer::Grounded("The sun is a star, and it is very hot.".to_string()));
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Question: What is the sun?\nHelpful Answer:"));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_unrelated_question_falls_back() {
        let llm = Arc::new(ScriptedLlm::new(|prompt| {
            if prompt.contains(QA_MARKER) {
                Ok("The capital of France is not mentioned in the transcript.".to_string())
            } else {
                Ok("Paris is the capital of France.".to_string())
            }
        }));
        let pipeline = NotesPipeline::new(llm.clone(), Arc::new(BagOfWordsEmbedder::default())).unwrap();
        let session = pipeline
            .build_session(
                "Photosynthesis converts light into chemical energy inside chloroplasts.",
                &PipelineConfig::default(),
            )
            .await
            .unwrap();

        let query = "What is the capital of France?";
        let answer = pipeline.chat(query, &session).await.unwrap();

        assert_eq!(answer, Answer::Fallback("Paris is the capital of France.".to_string()));
        assert_eq!(
            answer.render(),
            format!("\n{}\n\nParis is the capital of France.\n", FALLBACK_NOTICE)
        );

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1], query);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_makes_no_provider_calls() {
        let llm = Arc::new(ScriptedLlm::constant("unused"));
        let embedder = Arc::new(BagOfWordsEmbedder::default());
        let pipeline = NotesPipeline::new(llm.clone(), embedder.clone()).unwrap();
        let config = PipelineConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..PipelineConfig::default()
        };

        let err = pipeline
            .generate_notes("The sun is a star.", &PromptTemplate::default_qa(), &config)
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(embedder.calls(), 0);
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(ScriptedLlm::new(|_| {
            Err(Error::LLMProvider("HTTP 500: backend unavailable".to_string()))
        }));
        let pipeline = NotesPipeline::new(llm, Arc::new(BagOfWordsEmbedder::default())).unwrap();

        let err = pipeline
            .generate_notes("The sun is a star.", &PromptTemplate::default_qa(), &PipelineConfig::default())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::LLMProvider(_)));
    }

    #[tokio::test]
    async fn test_failed_fallback_propagates_without_retry() {
        let llm = Arc::new(ScriptedLlm::new(|prompt| {
            if prompt.contains(QA_MARKER) {
                Ok("not mentioned".to_string())
            } else {
                Err(Error::Network("connection reset".to_string()))
            }
        }));
        let pipeline = NotesPipeline::new(llm.clone(), Arc::new(BagOfWordsEmbedder::default())).unwrap();
        let session = pipeline
            .build_session("The sun is a star.", &PipelineConfig::default())
            .await
            .unwrap();

        let err = pipeline.chat("Who painted the Mona Lisa?", &session).await.unwrap_err();

        assert!(matches!(err, Error::Network(_)));
        assert_eq!(llm.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_session_reused_across_questions() {
        let llm = Arc::new(ScriptedLlm::constant("It is a star."));
        let embedder = Arc::new(BagOfWordsEmbedder::default());
        let pipeline = NotesPipeline::new(llm, embedder.clone()).unwrap();
        let (_, session) = pipeline
            .generate_notes(
                "The sun is a star. It is very hot.",
                &PromptTemplate::default_qa(),
                &PipelineConfig::default(),
            )
            .await
            .unwrap();
        let after_notes = embedder.calls();

        pipeline.chat("What is the sun?", &session).await.unwrap();
        pipeline.chat("Is it hot?", &session).await.unwrap();

        // One query embedding per question, no re-indexing.
        assert_eq!(embedder.calls(), after_notes + 2);
        assert_eq!(session.stats().await.unwrap()["chunks"], 1);
        session.close().await.unwrap();
    }
}
