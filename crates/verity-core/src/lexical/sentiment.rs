//! Fixed-lexicon sentiment scorer.
//!
//! Valence rules follow the VADER heuristics: booster and dampener words,
//! negation within three tokens, ALL-CAPS emphasis, contrastive "but", and
//! exclamation emphasis. The lexicon is small and compiled in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

const BOOSTER_INCR: f64 = 0.293;
const BOOSTER_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;
const EXCLAIM_INCR: f64 = 0.292;
const QUESTION_INCR: f64 = 0.18;

/// Sentiment polarity tuple. `pos`, `neu`, `neg` are proportions in 0.0–1.0;
/// `compound` is the normalised sum in -1.0–1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentScores {
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
    pub compound: f64,
}

impl SentimentScores {
    pub fn neutral() -> Self {
        Self {
            pos: 0.0,
            neu: 1.0,
            neg: 0.0,
            compound: 0.0,
        }
    }
}

impl Default for SentimentScores {
    fn default() -> Self {
        Self::neutral()
    }
}

#[rustfmt::skip]
const LEXICON: &[(&str, f64)] = &[
    // positive
    ("accurate", 1.6), ("amazing", 2.8), ("awesome", 3.1), ("beautiful", 2.9),
    ("benefit", 2.0), ("best", 3.2), ("better", 1.9), ("brilliant", 2.8),
    ("calm", 1.3), ("celebrate", 2.7), ("confident", 2.2), ("confirmed", 1.5),
    ("correct", 1.4), ("credible", 1.5), ("excellent", 2.7), ("fair", 1.3),
    ("fantastic", 2.6), ("free", 2.3), ("glad", 2.0), ("good", 1.9),
    ("great", 3.1), ("happy", 2.7), ("help", 1.7), ("helpful", 1.8),
    ("honest", 2.3), ("hope", 1.9), ("improve", 1.9), ("improved", 2.1),
    ("incredible", 1.7), ("love", 3.2), ("nice", 1.8), ("peace", 2.5),
    ("positive", 2.6), ("progress", 1.8), ("protect", 1.6), ("reliable", 1.9),
    ("safe", 1.9), ("success", 2.7), ("successful", 2.8), ("support", 1.7),
    ("thank", 1.5), ("true", 1.8), ("trust", 2.3), ("verified", 1.6),
    ("welcome", 2.0), ("win", 2.8), ("wonderful", 2.7),
    // negative
    ("abuse", -3.2), ("alarming", -2.2), ("angry", -2.3), ("attack", -2.1),
    ("awful", -2.0), ("bad", -2.5), ("catastrophe", -3.4), ("chaos", -2.7),
    ("cheat", -2.0), ("collapse", -2.2), ("corrupt", -3.0), ("crime", -2.5),
    ("crisis", -3.1), ("danger", -2.4), ("dangerous", -2.1), ("dead", -3.3),
    ("death", -2.9), ("deceive", -2.3), ("destroy", -2.5), ("devastating", -3.1),
    ("disaster", -3.1), ("evil", -3.4), ("fail", -2.5), ("failure", -2.3),
    ("fake", -2.1), ("fear", -2.2), ("fraud", -2.8), ("hate", -2.7),
    ("hoax", -2.0), ("horrible", -2.5), ("hurt", -2.4), ("kill", -3.7),
    ("killed", -3.5), ("liar", -2.6), ("lie", -1.8), ("lies", -1.8),
    ("lost", -1.3), ("outrage", -2.3), ("outrageous", -2.0), ("panic", -2.3),
    ("poor", -2.1), ("problem", -1.7), ("sad", -2.1), ("scam", -2.3),
    ("scandal", -2.6), ("shocking", -1.6), ("terrible", -2.1), ("terror", -3.0),
    ("threat", -2.4), ("tragic", -3.1), ("ugly", -2.3), ("victim", -2.4),
    ("violence", -3.1), ("war", -2.9), ("warning", -1.4), ("worst", -3.1),
    ("wrong", -2.1),
];

#[rustfmt::skip]
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOSTER_INCR), ("completely", BOOSTER_INCR), ("deeply", BOOSTER_INCR),
    ("enormously", BOOSTER_INCR), ("entirely", BOOSTER_INCR), ("extremely", BOOSTER_INCR),
    ("highly", BOOSTER_INCR), ("hugely", BOOSTER_INCR), ("incredibly", BOOSTER_INCR),
    ("most", BOOSTER_INCR), ("really", BOOSTER_INCR), ("so", BOOSTER_INCR),
    ("totally", BOOSTER_INCR), ("truly", BOOSTER_INCR), ("utterly", BOOSTER_INCR),
    ("very", BOOSTER_INCR),
    ("almost", BOOSTER_DECR), ("barely", BOOSTER_DECR), ("hardly", BOOSTER_DECR),
    ("less", BOOSTER_DECR), ("marginally", BOOSTER_DECR), ("partly", BOOSTER_DECR),
    ("scarcely", BOOSTER_DECR), ("slightly", BOOSTER_DECR), ("somewhat", BOOSTER_DECR),
];

#[rustfmt::skip]
const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont",
    "hadnt", "hasnt", "havent", "isnt", "neither", "never", "no", "nobody",
    "none", "nor", "not", "nothing", "nowhere", "shouldnt", "wasnt", "werent",
    "without", "wont", "wouldnt",
];

struct Tables {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        lexicon: LEXICON.iter().copied().collect(),
        boosters: BOOSTERS.iter().copied().collect(),
    })
}

/// Lexicon-based polarity scorer. Stateless; all tables are shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return SentimentScores::neutral();
        }

        let tables = tables();
        let caps_differential = caps_differential(&tokens);
        let lowered: Vec<String> = tokens.iter().map(|t| normalize_token(t)).collect();

        let mut sentiments: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let lower = lowered[i].as_str();
            let Some(&base) = tables.lexicon.get(lower) else {
                sentiments.push(0.0);
                continue;
            };

            let mut valence = base;
            if caps_differential && is_all_caps(token) {
                valence += CAPS_INCR.copysign(valence);
            }

            for distance in 1..=3usize {
                if i < distance {
                    break;
                }
                let prev = lowered[i - distance].as_str();
                if tables.lexicon.contains_key(prev) {
                    continue;
                }
                if let Some(&boost) = tables.boosters.get(prev) {
                    let damping = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    let mut scalar = boost * valence.signum();
                    if caps_differential && is_all_caps(tokens[i - distance]) {
                        scalar += CAPS_INCR * valence.signum();
                    }
                    valence += scalar * damping;
                }
                if NEGATIONS.contains(&prev) {
                    valence *= NEGATION_SCALAR;
                }
            }
            sentiments.push(valence);
        }

        apply_but_rule(&lowered, &mut sentiments);
        score_valence(&sentiments, text)
    }
}

fn normalize_token(token: &str) -> String {
    token.to_lowercase().replace('\'', "")
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(|c| c.is_alphabetic())
        && token
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
}

/// True when some, but not all, tokens are shouted.
fn caps_differential(tokens: &[&str]) -> bool {
    let shouted = tokens.iter().filter(|t| is_all_caps(t)).count();
    shouted > 0 && shouted < tokens.len()
}

fn apply_but_rule(lowered: &[String], sentiments: &mut [f64]) {
    if let Some(pivot) = lowered.iter().position(|t| t == "but") {
        for (i, s) in sentiments.iter_mut().enumerate() {
            if i < pivot {
                *s *= 0.5;
            } else if i > pivot {
                *s *= 1.5;
            }
        }
    }
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclaims = text.matches('!').count().min(4) as f64;
    let questions = text.matches('?').count();
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCR,
        _ => 0.96,
    };
    exclaims * EXCLAIM_INCR + question_amp
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn score_valence(sentiments: &[f64], text: &str) -> SentimentScores {
    let sum: f64 = sentiments.iter().sum();
    if sum == 0.0 && sentiments.iter().all(|s| *s == 0.0) {
        return SentimentScores::neutral();
    }

    let emphasis = punctuation_emphasis(text);
    let emphasized = if sum > 0.0 {
        sum + emphasis
    } else if sum < 0.0 {
        sum - emphasis
    } else {
        sum
    };
    let compound = (emphasized / (emphasized * emphasized + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for s in sentiments {
        if *s > 0.0 {
            pos_sum += s + 1.0;
        } else if *s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += emphasis;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= emphasis;
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    SentimentScores {
        pos: round3((pos_sum / total).abs()),
        neu: round3((neu_count / total).abs()),
        neg: round3((neg_sum / total).abs()),
        compound: round3(compound),
    }
}
