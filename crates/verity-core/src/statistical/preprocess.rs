//! Deterministic text cleaning applied before vectorization.

use regex::Regex;
use std::sync::OnceLock;

struct Cleaners {
    urls: Option<Regex>,
    non_letters: Option<Regex>,
}

fn cleaners() -> &'static Cleaners {
    static CLEANERS: OnceLock<Cleaners> = OnceLock::new();
    CLEANERS.get_or_init(|| Cleaners {
        urls: Regex::new(r"http\S+|www\S+").ok(),
        non_letters: Regex::new(r"[^a-z\s]").ok(),
    })
}

/// Lowercase, strip URLs, replace everything but `a-z` and whitespace with a
/// space, then collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let cleaners = cleaners();
    let mut out = text.to_lowercase();
    if let Some(re) = &cleaners.urls {
        out = re.replace_all(&out, " ").into_owned();
    }
    if let Some(re) = &cleaners.non_letters {
        out = re.replace_all(&out, " ").into_owned();
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
