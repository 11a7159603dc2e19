//! Normalization of image-classifier labels and correction detection.

use crate::issue::IssueType;

/// Minimum length for a partial label to match by containment.
const MIN_PARTIAL_LABEL_LEN: usize = 4;

/// Lower-case, trim, and join whitespace runs with `_`.
///
/// `"Open Manhole "` becomes `"open_manhole"`.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Map a classifier label onto the issue-type vocabulary.
///
/// Tries an exact match first, then a vocabulary word contained in the label
/// (`"potholes_detected"`), then the label contained in a vocabulary word
/// (`"pothole"`). Returns `None` when nothing matches so the caller keeps the
/// user's manual selection.
pub fn match_issue_type(raw: &str) -> Option<IssueType> {
    let label = normalize_label(raw);
    if label.is_empty() {
        return None;
    }
    if let Ok(t) = label.parse::<IssueType>() {
        return Some(t);
    }
    if let Some(t) = IssueType::ALL
        .into_iter()
        .find(|t| label.contains(t.as_str()))
    {
        return Some(t);
    }
    if label.len() >= MIN_PARTIAL_LABEL_LEN {
        return IssueType::ALL
            .into_iter()
            .find(|t| t.as_str().contains(label.as_str()));
    }
    None
}

/// Whether the user's final selection overrides the classifier's prediction.
///
/// Both sides are normalized first, so `"Garbage"` and `"garbage "` agree.
pub fn is_correction(predicted: &str, actual: &str) -> bool {
    let predicted = normalize_label(predicted);
    let actual = normalize_label(actual);
    !predicted.is_empty() && !actual.is_empty() && predicted != actual
}

/// Strip a `data:<mime>;base64,` prefix, returning the raw base64 payload.
pub fn strip_data_url(image: &str) -> &str {
    let trimmed = image.trim();
    if trimmed.starts_with("data:") {
        match trimmed.find(',') {
            Some(idx) => &trimmed[idx + 1..],
            None => trimmed,
        }
    } else {
        trimmed
    }
}
