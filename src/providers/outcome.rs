//! Outcome of a remote lookup that keeps "nothing found" apart from
//! "could not ask".

use crate::KapowError;

/// Result of a tag or image lookup.
///
/// Callers that only want items use [`ApiOutcome::into_items`], which
/// collapses `Empty` and `Failed` to an empty vec. The distinction stays
/// available for logging and metrics.
#[derive(Debug)]
pub enum ApiOutcome<T> {
    /// At least one item.
    Items(Vec<T>),
    /// The remote answered, but with nothing usable.
    Empty,
    /// Transport failure, non-2xx status or malformed body.
    Failed(KapowError),
}

impl<T> ApiOutcome<T> {
    /// `Items` when non-empty, `Empty` otherwise.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            ApiOutcome::Empty
        } else {
            ApiOutcome::Items(items)
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ApiOutcome::Items(items) => items,
            ApiOutcome::Empty | ApiOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ApiOutcome::Failed(_))
    }

    pub fn is_empty(&self) -> bool {
        !matches!(self, ApiOutcome::Items(_))
    }

    /// Metric label for this outcome.
    pub fn status_label(&self) -> &'static str {
        match self {
            ApiOutcome::Items(_) => "ok",
            ApiOutcome::Empty => "empty",
            ApiOutcome::Failed(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_items_empty_vec_is_empty() {
        let outcome: ApiOutcome<u8> = ApiOutcome::from_items(vec![]);
        assert!(matches!(outcome, ApiOutcome::Empty));
        assert_eq!(outcome.status_label(), "empty");
    }

    #[test]
    fn failed_collapses_to_no_items() {
        let outcome: ApiOutcome<u8> = ApiOutcome::Failed(KapowError::AuthenticationFailed);
        assert!(outcome.is_failed());
        assert!(outcome.is_empty());
        assert!(outcome.into_items().is_empty());
    }

    #[test]
    fn items_pass_through() {
        let outcome = ApiOutcome::from_items(vec![1, 2]);
        assert!(!outcome.is_empty());
        assert_eq!(outcome.into_items(), vec![1, 2]);
    }
}
