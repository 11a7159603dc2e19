//! Normalization of the priority advisor's free-text answer.
//!
//! The advisor is asked for one word (Critical / Normal / Low) but may return
//! anything. The answer is lower-cased, trimmed and substring-matched against
//! the fixed vocabulary; unmatched answers fall back to `normal`.

use serde::{Deserialize, Serialize};

use crate::issue::{Criticality, Priority};

/// Coarse urgency suggested by the advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityAdvice {
    Critical,
    Normal,
    Low,
}

impl PriorityAdvice {
    /// Match order matters: "critical" is checked before the others.
    const VOCABULARY: [(&'static str, PriorityAdvice); 3] = [
        ("critical", PriorityAdvice::Critical),
        ("normal", PriorityAdvice::Normal),
        ("low", PriorityAdvice::Low),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityAdvice::Critical => "critical",
            PriorityAdvice::Normal => "normal",
            PriorityAdvice::Low => "low",
        }
    }

    /// Issue priority stored for this advice.
    pub fn priority(self) -> Priority {
        match self {
            PriorityAdvice::Critical => Priority::High,
            PriorityAdvice::Normal => Priority::Medium,
            PriorityAdvice::Low => Priority::Low,
        }
    }

    pub fn criticality(self) -> Criticality {
        match self {
            PriorityAdvice::Critical => Criticality::Critical,
            PriorityAdvice::Normal | PriorityAdvice::Low => Criticality::Normal,
        }
    }
}

/// Map a raw advisor response onto the vocabulary, defaulting to `Normal`.
pub fn normalize_priority(raw: &str) -> PriorityAdvice {
    let text = raw.trim().to_lowercase();
    PriorityAdvice::VOCABULARY
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, advice)| *advice)
        .unwrap_or(PriorityAdvice::Normal)
}

/// Build the one-word classification prompt sent to the advisor.
pub fn build_prompt(
    issue_type: &str,
    description: Option<&str>,
    location: Option<&str>,
    has_image: bool,
) -> String {
    format!(
        "You are a civic issue classifier. Classify the issue into one of these categories: \
         Critical, Normal, Low.\n\n\
         Details:\n\
         - Issue Type: {issue_type}\n\
         - Description: {}\n\
         - Location: {}\n\
         - Image: {}\n\
         Focus more on image and description for classification.\n\
         Return only one word: Critical / Normal / Low.",
        description.unwrap_or("Not provided"),
        location.unwrap_or("Not provided"),
        if has_image { "Included" } else { "No image provided" },
    )
}
