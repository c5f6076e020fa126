//! Syntactic feature extraction.
//!
//! The lexical analyzer accepts any [`SyntaxParser`]; [`HeuristicParser`] is
//! the built-in rule-based one. Without a parser the feature set is empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors a parser may report. Any of them degrades the lexical report.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("parse failed: {0}")]
    Failed(String),
}

/// Linguistic features of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinguisticFeatures {
    pub sentence_count: usize,
    /// Non-whitespace tokens, punctuation included.
    pub word_count: usize,
    /// Mean token length in characters.
    pub avg_word_length: f64,
    pub named_entities: usize,
    /// Coarse part-of-speech histogram keyed by universal tag name.
    pub pos_tags: BTreeMap<String, usize>,
}

pub trait SyntaxParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<LinguisticFeatures, SyntaxError>;
}

#[rustfmt::skip]
const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some",
    "any", "all", "both", "either", "neither", "no",
];
#[rustfmt::skip]
const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "yours", "he", "him", "his", "she",
    "her", "hers", "it", "its", "we", "us", "our", "ours", "they", "them",
    "their", "theirs", "who", "whom", "whose", "which", "what",
];
#[rustfmt::skip]
const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between",
    "into", "through", "during", "before", "after", "above", "below", "to",
    "from", "up", "down", "of", "off", "over", "under", "since", "until",
];
const CONJUNCTIONS: &[&str] = &["and", "but", "or", "nor", "so", "yet"];
#[rustfmt::skip]
const AUXILIARIES: &[&str] = &[
    "is", "am", "are", "was", "were", "be", "been", "being", "has", "have",
    "had", "do", "does", "did", "will", "would", "shall", "should", "can",
    "could", "may", "might", "must",
];

/// Rule-based parser over closed-class word lists. Deterministic, no model
/// files.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for raw in text.split_whitespace() {
            let mut word = String::new();
            for c in raw.chars() {
                if c.is_alphanumeric() || c == '\'' || c == '-' {
                    word.push(c);
                } else {
                    if !word.is_empty() {
                        tokens.push(std::mem::take(&mut word));
                    }
                    tokens.push(c.to_string());
                }
            }
            if !word.is_empty() {
                tokens.push(word);
            }
        }
        tokens
    }

    fn tag(token: &str, sentence_initial: bool) -> &'static str {
        let first = token.chars().next().unwrap_or(' ');
        if !first.is_alphanumeric() {
            return "PUNCT";
        }
        if token.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
            return "NUM";
        }
        let lower = token.to_lowercase();
        let lower = lower.as_str();
        if DETERMINERS.contains(&lower) {
            "DET"
        } else if PRONOUNS.contains(&lower) {
            "PRON"
        } else if ADPOSITIONS.contains(&lower) {
            "ADP"
        } else if CONJUNCTIONS.contains(&lower) {
            "CCONJ"
        } else if AUXILIARIES.contains(&lower) {
            "AUX"
        } else if first.is_uppercase() && !sentence_initial {
            "PROPN"
        } else {
            "X"
        }
    }
}

fn is_terminal(token: &str) -> bool {
    matches!(token, "." | "!" | "?")
}

impl SyntaxParser for HeuristicParser {
    fn parse(&self, text: &str) -> Result<LinguisticFeatures, SyntaxError> {
        let tokens = Self::tokenize(text);

        let mut pos_tags: BTreeMap<String, usize> = BTreeMap::new();
        let mut sentence_count = 0usize;
        let mut in_sentence = false;
        let mut sentence_initial = true;
        let mut named_entities = 0usize;
        let mut entity_run = 0usize;

        for token in &tokens {
            let tag = Self::tag(token, sentence_initial);
            *pos_tags.entry(tag.to_string()).or_insert(0) += 1;

            if tag == "PROPN" {
                entity_run += 1;
            } else {
                if entity_run > 0 {
                    named_entities += 1;
                }
                entity_run = 0;
            }

            if is_terminal(token) {
                if in_sentence {
                    sentence_count += 1;
                }
                in_sentence = false;
                sentence_initial = true;
            } else if tag != "PUNCT" {
                in_sentence = true;
                sentence_initial = false;
            }
        }
        if entity_run > 0 {
            named_entities += 1;
        }
        if in_sentence {
            sentence_count += 1;
        }

        let word_count = tokens.len();
        let avg_word_length = if word_count == 0 {
            0.0
        } else {
            tokens.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / word_count as f64
        };

        Ok(LinguisticFeatures {
            sentence_count,
            word_count,
            avg_word_length,
            named_entities,
            pos_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_sentences_and_tokens() {
        let features = HeuristicParser::new()
            .parse("The mayor spoke today. Residents cheered!")
            .unwrap();
        assert_eq!(features.sentence_count, 2);
        // 6 words + 2 punctuation marks
        assert_eq!(features.word_count, 8);
        assert_eq!(features.pos_tags.get("PUNCT"), Some(&2));
        assert_eq!(features.pos_tags.get("DET"), Some(&1));
    }

    #[test]
    fn capitalised_runs_count_as_one_entity() {
        let features = HeuristicParser::new()
            .parse("Officials in New York met with the World Health Organization.")
            .unwrap();
        assert_eq!(features.named_entities, 2);
    }

    #[test]
    fn trailing_sentence_without_punctuation_counts() {
        let features = HeuristicParser::new().parse("no punctuation here").unwrap();
        assert_eq!(features.sentence_count, 1);
        assert!(features.avg_word_length > 0.0);
    }

    #[test]
    fn empty_text_has_zero_features() {
        let features = HeuristicParser::new().parse("").unwrap();
        assert_eq!(features.sentence_count, 0);
        assert_eq!(features.word_count, 0);
        assert_eq!(features.avg_word_length, 0.0);
    }
}
