/// Tag catalog and tag-set reconciliation
use crate::models::Tag;

/// Read-only tag catalog loaded at startup and shared across workers.
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tags: Vec<Tag>,
}

impl TagCatalog {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// Outcome of comparing a post's stored tag set against a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDecision {
    /// Sets are equal; existing associations are preserved untouched.
    Keep,
    /// Sets differ; delete every existing association and insert the
    /// submitted set. There is no incremental diff.
    ReplaceAll,
}

/// Compare the existing association set against the submitted one.
///
/// Equality is a sorted-sequence comparison: order-insensitive, but
/// duplicate counts matter.
pub fn reconcile(existing: &[i64], submitted: &[i64]) -> TagDecision {
    if sorted(existing) == sorted(submitted) {
        TagDecision::Keep
    } else {
        TagDecision::ReplaceAll
    }
}

fn sorted(ids: &[i64]) -> Vec<i64> {
    let mut out = ids.to_vec();
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sets_are_kept() {
        assert_eq!(reconcile(&[1, 2, 3], &[1, 2, 3]), TagDecision::Keep);
    }

    #[test]
    fn reordered_sets_are_kept() {
        assert_eq!(reconcile(&[3, 1, 2], &[2, 3, 1]), TagDecision::Keep);
    }

    #[test]
    fn different_sets_are_replaced() {
        assert_eq!(reconcile(&[1, 2], &[1, 3]), TagDecision::ReplaceAll);
        assert_eq!(reconcile(&[1, 2], &[1]), TagDecision::ReplaceAll);
        assert_eq!(reconcile(&[], &[1]), TagDecision::ReplaceAll);
    }

    #[test]
    fn duplicate_counts_matter() {
        assert_eq!(reconcile(&[1, 1, 2], &[1, 2]), TagDecision::ReplaceAll);
        assert_eq!(reconcile(&[1, 1, 2], &[2, 1, 1]), TagDecision::Keep);
    }

    #[test]
    fn empty_sets_are_equal() {
        assert_eq!(reconcile(&[], &[]), TagDecision::Keep);
    }
}
