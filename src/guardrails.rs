//! Content guardrails run alongside sentiment analysis.
//!
//! Supports:
//! - Toxicity (small word list)
//! - PII (email addresses, phone numbers)
//! - Prompt injection (known phrases)
//!
//! Each enabled check yields a score in [0, 0.99] which maps onto a verdict.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use utoipa::ToSchema;
use uuid::Uuid;

const BLOCK_THRESHOLD: f64 = 0.95;
const WARN_THRESHOLD: f64 = 0.80;

const TOXIC_WORDS: &[&str] = &["stupid", "idiot", "hate", "kill", "ugly"];

const INJECTION_PHRASES: &[&str] = &[
    "ignore previous instructions",
    "system prompt",
    "reveal secrets",
    "forget everything",
];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email pattern")
});

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\d{1,2}\s?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").expect("valid phone pattern")
});

/// Which checks to run. Missing fields are off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct GuardrailConfig {
    pub toxicity: bool,
    pub pii: bool,
    pub prompt_injection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum GuardrailVerdict {
    Pass,
    Warn,
    Block,
}

impl GuardrailVerdict {
    pub fn from_score(score: f64) -> Self {
        if score >= BLOCK_THRESHOLD {
            GuardrailVerdict::Block
        } else if score >= WARN_THRESHOLD {
            GuardrailVerdict::Warn
        } else {
            GuardrailVerdict::Pass
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GuardrailResult {
    pub score: f64,
    pub verdict: GuardrailVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GuardrailResult {
    fn new(score: f64, reason: Option<String>) -> Self {
        Self {
            score,
            verdict: GuardrailVerdict::from_score(score),
            reason,
        }
    }

    fn pass() -> Self {
        Self::new(0.0, None)
    }
}

/// Outcome of one validation pass, keyed by check name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuardrailReport {
    pub request_id: String,
    pub results: BTreeMap<String, GuardrailResult>,
    pub time_taken_ms: u64,
}

impl GuardrailReport {
    /// True if any check came back BLOCK.
    pub fn is_blocked(&self) -> bool {
        self.results
            .values()
            .any(|r| r.verdict == GuardrailVerdict::Block)
    }
}

/// Runs the checks enabled in `config` over `text`.
pub fn validate(text: &str, config: &GuardrailConfig) -> GuardrailReport {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let mut results = BTreeMap::new();

    if config.toxicity {
        results.insert("toxicity".to_string(), check_toxicity(text));
    }
    if config.pii {
        results.insert("pii".to_string(), check_pii(text));
    }
    if config.prompt_injection {
        results.insert("prompt_injection".to_string(), check_prompt_injection(text));
    }

    let report = GuardrailReport {
        request_id,
        results,
        time_taken_ms: started.elapsed().as_millis() as u64,
    };

    if report.is_blocked() {
        tracing::warn!(request_id = %report.request_id, "🛡️ Guardrail blocked review text");
    }

    report
}

pub fn check_toxicity(text: &str) -> GuardrailResult {
    let lowered = text.to_lowercase();
    let found: Vec<&str> = TOXIC_WORDS
        .iter()
        .copied()
        .filter(|word| lowered.contains(word))
        .collect();

    if found.is_empty() {
        return GuardrailResult::pass();
    }

    // Any hit is at least WARN; three or more is BLOCK.
    let score = if found.len() >= 3 {
        0.99
    } else {
        (0.4 + (found.len() - 1) as f64 * 0.2).clamp(WARN_THRESHOLD, 0.99)
    };

    GuardrailResult::new(score, Some(format!("Found toxic words: {}", found.join(", "))))
}

pub fn check_pii(text: &str) -> GuardrailResult {
    let mut detected = Vec::new();
    if EMAIL_REGEX.is_match(text) {
        detected.push("Email");
    }
    if PHONE_REGEX.is_match(text) {
        detected.push("Phone Number");
    }

    if detected.is_empty() {
        GuardrailResult::pass()
    } else {
        GuardrailResult::new(0.99, Some(format!("Detected PII: {}", detected.join(", "))))
    }
}

pub fn check_prompt_injection(text: &str) -> GuardrailResult {
    let lowered = text.to_lowercase();
    INJECTION_PHRASES
        .iter()
        .find(|phrase| lowered.contains(**phrase))
        .map(|phrase| {
            GuardrailResult::new(0.99, Some(format!("Detected injection keyword: \"{}\"", phrase)))
        })
        .unwrap_or_else(GuardrailResult::pass)
}
