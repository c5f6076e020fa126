//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Result, SubjectLimits, VerityError, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
use crate::evidence::{EvidenceCollector, DEFAULT_EVIDENCE_TIMEOUT};
use crate::fusion::FusionEngine;
use crate::generative::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::generative::{GeminiClient, GeminiConfig, GenerativeJudge, DEFAULT_JUDGE_TIMEOUT};
use crate::statistical::StatisticalClassifier;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "VERITY_GEMINI_MODEL";
pub const ENV_ENDPOINT: &str = "VERITY_GEMINI_ENDPOINT";
pub const ENV_JUDGE_TIMEOUT_SECS: &str = "VERITY_JUDGE_TIMEOUT_SECS";
pub const ENV_EVIDENCE_TIMEOUT_MS: &str = "VERITY_EVIDENCE_TIMEOUT_MS";
pub const ENV_MODEL_DIR: &str = "VERITY_MODEL_DIR";
pub const ENV_MIN_TEXT_CHARS: &str = "VERITY_MIN_TEXT_CHARS";
pub const ENV_MAX_TEXT_CHARS: &str = "VERITY_MAX_TEXT_CHARS";

#[derive(Debug, Clone)]
pub struct VerityConfig {
    /// Generative-service credential. `None` runs the judge degraded.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub judge_timeout: Duration,
    pub evidence_timeout: Duration,
    /// Directory holding the classifier artifacts.
    pub model_dir: PathBuf,
    pub limits: SubjectLimits,
}

impl Default for VerityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            judge_timeout: DEFAULT_JUDGE_TIMEOUT,
            evidence_timeout: DEFAULT_EVIDENCE_TIMEOUT,
            model_dir: PathBuf::from("."),
            limits: SubjectLimits::default(),
        }
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| VerityError::InvalidConfig {
            key: key.to_string(),
            value,
        }),
    }
}

impl VerityConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let limits = SubjectLimits {
            min_chars: parse_num(ENV_MIN_TEXT_CHARS, get(ENV_MIN_TEXT_CHARS), DEFAULT_MIN_CHARS)?,
            max_chars: parse_num(ENV_MAX_TEXT_CHARS, get(ENV_MAX_TEXT_CHARS), DEFAULT_MAX_CHARS)?,
        };
        if limits.min_chars == 0 || limits.min_chars > limits.max_chars {
            return Err(VerityError::InvalidConfig {
                key: ENV_MIN_TEXT_CHARS.to_string(),
                value: format!("{} (max {})", limits.min_chars, limits.max_chars),
            });
        }

        let judge_secs = parse_num(
            ENV_JUDGE_TIMEOUT_SECS,
            get(ENV_JUDGE_TIMEOUT_SECS),
            DEFAULT_JUDGE_TIMEOUT.as_secs(),
        )?;
        let evidence_ms = parse_num(
            ENV_EVIDENCE_TIMEOUT_MS,
            get(ENV_EVIDENCE_TIMEOUT_MS),
            DEFAULT_EVIDENCE_TIMEOUT.as_millis() as u64,
        )?;

        Ok(Self {
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: get(ENV_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            judge_timeout: Duration::from_secs(judge_secs),
            evidence_timeout: Duration::from_millis(evidence_ms),
            model_dir: get(ENV_MODEL_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            limits,
        })
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// The generative judge this configuration describes.
    pub fn build_judge(&self) -> Result<GenerativeJudge> {
        let judge = match &self.api_key {
            Some(key) => {
                let gemini = GeminiConfig::new(key)
                    .with_model(&self.model)
                    .with_endpoint(&self.endpoint)
                    .with_timeout(self.judge_timeout);
                let client = GeminiClient::new(gemini)
                    .map_err(|e| VerityError::ServiceUnavailable(e.to_string()))?;
                GenerativeJudge::new(Arc::new(client))
            }
            None => GenerativeJudge::unconfigured(),
        };
        Ok(judge.with_timeout(self.judge_timeout))
    }

    /// Load classifier artifacts and assemble the engine. Missing artifacts
    /// leave the classifier degraded rather than failing.
    pub fn build_engine(&self) -> Result<FusionEngine> {
        let judge = self.build_judge()?;
        let classifier = StatisticalClassifier::from_dir(&self.model_dir);
        Ok(FusionEngine::new(judge, classifier)
            .with_evidence(EvidenceCollector::default().with_timeout(self.evidence_timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = VerityConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.has_credential());
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.judge_timeout, Duration::from_secs(30));
        assert_eq!(config.evidence_timeout, Duration::from_millis(2000));
        assert_eq!(config.limits, SubjectLimits::default());
        assert_eq!(config.model_dir, PathBuf::from("."));
    }

    #[test]
    fn overrides_are_read() {
        let config = VerityConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "secret"),
            (ENV_MODEL, "gemini-1.5-flash"),
            (ENV_JUDGE_TIMEOUT_SECS, "5"),
            (ENV_MIN_TEXT_CHARS, "20"),
            (ENV_MODEL_DIR, "/var/lib/verity"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.judge_timeout, Duration::from_secs(5));
        assert_eq!(config.limits.min_chars, 20);
        assert_eq!(config.model_dir, PathBuf::from("/var/lib/verity"));
    }

    #[test]
    fn blank_credential_counts_as_unset() {
        let config = VerityConfig::from_lookup(lookup(&[(ENV_API_KEY, "  ")])).unwrap();
        assert!(!config.has_credential());
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = VerityConfig::from_lookup(lookup(&[(ENV_JUDGE_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            VerityError::InvalidConfig { ref key, .. } if key == ENV_JUDGE_TIMEOUT_SECS
        ));
    }

    #[test]
    fn inverted_limits_are_rejected() {
        let err = VerityConfig::from_lookup(lookup(&[
            (ENV_MIN_TEXT_CHARS, "500"),
            (ENV_MAX_TEXT_CHARS, "100"),
        ]))
        .unwrap_err();
        assert!(matches!(err, VerityError::InvalidConfig { .. }));
    }

    #[test]
    fn engine_builds_without_credential_or_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let engine = VerityConfig::default()
            .with_model_dir(dir.path())
            .build_engine()
            .unwrap();
        assert!(!engine.judge().is_configured());
        assert!(!engine.classifier().is_loaded());
    }

    #[test]
    fn credential_configures_judge() {
        let judge = VerityConfig::default().with_api_key("k").build_judge().unwrap();
        assert!(judge.is_configured());
    }
}
