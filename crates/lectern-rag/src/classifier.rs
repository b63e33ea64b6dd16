//! Detects grounded answers that say the transcript had nothing to offer

use regex::Regex;

use lectern_core::{AnswerClassifier, Error, MatchPolicy, Result};

/// Phrases that mark an answer as "nothing found in the transcript"
pub const NO_ANSWER_PHRASES: &[&str] = &[
    "does not consist",
    "doesn't contain information",
    "not found",
    "absent",
    "missing",
    "does not explain",
    "not present",
    "not mentioned",
    "not included",
    "not discussed",
    "not covered",
    "not addressed",
    "not specified",
    "not detailed",
    "not elaborated",
    "not described",
    "not explained",
    "not contain",
    "not provided",
    "not available",
    "no information on",
    "no details on",
    "does not, however, provide a direct answer",
    "don't know",
    "cannot answer",
    "unable to answer",
    "no information available",
    "no relevant information found",
    "no details provided",
    "no context available",
    "not applicable",
    "not relevant",
    "not related",
    "not pertinent",
    "not useful",
    "not helpful",
    "not informative",
    "not insightful",
    "not conclusive",
    "not definitive",
    "not satisfactory",
    "can't answer",
    "can't provide",
    "can't find",
    "can't locate",
    "can't retrieve",
    "can't access",
    "can't obtain",
    "can't discover",
    "can't identify",
    "can't determine",
    "can't clarify",
    "can't explain",
    "can't elaborate",
    "can't detail",
    "can't describe",
    "can't specify",
    "can't mention",
    "can't cover",
    "can't address",
    "not applicable to the question",
];

/// Case-insensitive phrase matcher with a configurable match policy
#[derive(Debug, Clone)]
pub struct PhraseClassifier {
    phrases: Vec<String>,
    policy: MatchPolicy,
    word_patterns: Vec<Regex>,
}

impl PhraseClassifier {
    /// Classifier over the built-in phrase list
    pub fn new(policy: MatchPolicy) -> Result<Self> {
        Self::with_phrases(NO_ANSWER_PHRASES, policy)
    }

    /// Classifier over a caller-supplied phrase list
    pub fn with_phrases<I, S>(phrases: I, policy: MatchPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| Self::normalize(p.as_ref()).trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if phrases.is_empty() {
            return Err(Error::Configuration(
                "Phrase classifier needs at least one phrase".to_string(),
            ));
        }

        let word_patterns = phrases
            .iter()
            .map(|p| Self::word_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            phrases,
            policy,
            word_patterns,
        })
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    fn word_pattern(phrase: &str) -> Result<Regex> {
        Regex::new(&format!(r"\b{}\b", regex::escape(phrase)))
            .map_err(|e| Error::Configuration(format!("Invalid phrase '{}': {}", phrase, e)))
    }

    /// Lower-case and fold typographic apostrophes to ASCII
    fn normalize(text: &str) -> String {
        text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
    }

    /// First phrase that matches the answer, if any
    pub fn matched_phrase(&self, answer: &str) -> Option<&str> {
        let normalized = Self::normalize(answer);

        let position = match self.policy {
            MatchPolicy::Substring => self
                .phrases
                .iter()
                .position(|p| normalized.contains(p.as_str())),
            MatchPolicy::WholeWord => self
                .word_patterns
                .iter()
                .position(|re| re.is_match(&normalized)),
            MatchPolicy::Exact => {
                let trimmed = normalized.trim().trim_end_matches(['.', '!']).trim_end();
                self.phrases.iter().position(|p| p == trimmed)
            }
        };

        position.map(|i| self.phrases[i].as_str())
    }
}

impl AnswerClassifier for PhraseClassifier {
    fn is_unanswered(&self, answer: &str) -> bool {
        self.matched_phrase(answer).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phrase_alone_triggers_every_policy() {
        for policy in [MatchPolicy::Substring, MatchPolicy::WholeWord, MatchPolicy::Exact] {
            let classifier = PhraseClassifier::new(policy).unwrap();
            for phrase in NO_ANSWER_PHRASES {
                assert!(classifier.is_unanswered(phrase), "{:?} missed '{}'", policy, phrase);
            }
        }
    }

    #[test]
    fn test_builtin_list_compiles_a_pattern_per_phrase() {
        let classifier = PhraseClassifier::new(MatchPolicy::WholeWord).unwrap();
        assert_eq!(classifier.phrases().len(), NO_ANSWER_PHRASES.len());
        assert_eq!(classifier.word_patterns.len(), NO_ANSWER_PHRASES.len());
        assert!(classifier.is_unanswered("does not, however, provide a direct answer"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let classifier = PhraseClassifier::new(MatchPolicy::default()).unwrap();
        assert!(classifier.is_unanswered("The Transcript Does Not Explain photosynthesis."));
        assert!(classifier.is_unanswered("I DON'T KNOW."));
    }

    #[test]
    fn test_typographic_apostrophe() {
        let classifier = PhraseClassifier::new(MatchPolicy::default()).unwrap();
        assert!(classifier.is_unanswered("I don\u{2019}t know the answer."));
    }

    #[test]
    fn test_clean_answer_is_not_flagged() {
        let classifier = PhraseClassifier::new(MatchPolicy::default()).unwrap();
        assert!(!classifier.is_unanswered("The sun is a star. It is very hot."));
        assert_eq!(classifier.matched_phrase("The sun is a star."), None);
    }

    #[test]
    fn test_substring_policy_flags_embedded_phrase() {
        let classifier = PhraseClassifier::new(MatchPolicy::Substring).unwrap();
        let answer = "Rust prevents dangling pointers; a null value is absent by design.";
        assert_eq!(classifier.matched_phrase(answer), Some("absent"));

        // Substring containment also fires inside longer words.
        assert!(classifier.is_unanswered("Lecturers often discuss absenteeism."));
    }

    #[test]
    fn test_whole_word_policy_ignores_partial_words() {
        let classifier = PhraseClassifier::new(MatchPolicy::WholeWord).unwrap();
        assert!(!classifier.is_unanswered("Lecturers often discuss absenteeism."));
        assert!(classifier.is_unanswered("That topic is not mentioned in the lecture."));
    }

    #[test]
    fn test_exact_policy_requires_whole_answer() {
        let classifier = PhraseClassifier::new(MatchPolicy::Exact).unwrap();
        assert!(classifier.is_unanswered("  Not mentioned.  "));
        assert!(!classifier.is_unanswered("That topic is not mentioned in the lecture."));
    }

    #[test]
    fn test_custom_phrases() {
        let classifier =
            PhraseClassifier::with_phrases(["No Idea", "  "], MatchPolicy::Substring).unwrap();
        assert_eq!(classifier.phrases(), &["no idea".to_string()]);
        assert!(classifier.is_unanswered("Honestly, no idea."));
        assert!(!classifier.is_unanswered("not mentioned"));
    }

    #[test]
    fn test_custom_phrases_must_not_be_empty() {
        let err = PhraseClassifier::with_phrases(Vec::<String>::new(), MatchPolicy::Exact).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
