//! Label-to-catalog matching strategy.
//!
//! The pipeline matches recognizer output against catalog names through this
//! seam so normalization rules (accent folding, synonym tables) can change
//! without touching the pipeline itself.

/// Normalizes a raw label into the form catalog names are stored in.
pub trait MatchStrategy: Send + Sync {
    fn normalize(&self, label: &str) -> String;
}

/// Exact matching: trim surrounding whitespace and lowercase.
///
/// Unicode-aware lowercasing, so Vietnamese names ("Chuối", "DƯA HẤU")
/// normalize the same way ASCII ones do.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn normalize(&self, label: &str) -> String {
        label.trim().to_lowercase()
    }
}
