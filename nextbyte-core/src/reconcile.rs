//! Recipe book membership reconciliation.
//!
//! Turns a desired set of recipe ids and the set currently linked to a book
//! into the smallest add/remove pair that makes the book match.

use std::collections::HashSet;

/// Removes duplicate ids, keeping the first occurrence of each.
pub fn dedup_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(Into::into)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Ids to link to and unlink from a book. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    /// `desired - current`, in desired order
    pub to_add: Vec<String>,
    /// `current - desired`, in current order
    pub to_remove: Vec<String>,
}

impl MembershipDelta {
    /// Computes the delta between the desired and current memberships.
    ///
    /// Both inputs are deduplicated first.
    pub fn compute<D, C, S, T>(desired: D, current: C) -> Self
    where
        D: IntoIterator<Item = S>,
        C: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let desired = dedup_ids(desired);
        let current = dedup_ids(current);

        let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();
        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();

        let to_add = desired
            .iter()
            .filter(|id| !current_set.contains(id.as_str()))
            .cloned()
            .collect();
        let to_remove = current
            .iter()
            .filter(|id| !desired_set.contains(id.as_str()))
            .cloned()
            .collect();

        Self { to_add, to_remove }
    }

    /// Returns true if the book already matches.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Applies the delta to a membership set.
    pub fn apply<'a, I>(&self, current: I) -> HashSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut result: HashSet<String> = current.into_iter().cloned().collect();
        result.extend(self.to_add.iter().cloned());
        for id in &self.to_remove {
            result.remove(id);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_sets() {
        let delta = MembershipDelta::compute(["1", "2", "3"], ["2", "3", "4"]);
        assert_eq!(delta.to_add, vec!["1"]);
        assert_eq!(delta.to_remove, vec!["4"]);
    }

    #[test]
    fn test_empty_desired_removes_everything() {
        let delta = MembershipDelta::compute(Vec::<String>::new(), ["5"]);
        assert!(delta.to_add.is_empty());
        assert_eq!(delta.to_remove, vec!["5"]);
    }

    #[test]
    fn test_identical_sets_are_empty() {
        let delta = MembershipDelta::compute(["a", "b"], ["b", "a"]);
        assert!(delta.is_empty());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let delta = MembershipDelta::compute(["x", "x", "y"], ["z", "z"]);
        assert_eq!(delta.to_add, vec!["x", "y"]);
        assert_eq!(delta.to_remove, vec!["z"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(dedup_ids(["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_apply() {
        let current = vec!["2".to_string(), "3".to_string(), "4".to_string()];
        let delta = MembershipDelta::compute(["1", "2", "3"], current.iter().cloned());
        let result = delta.apply(&current);

        let expected: HashSet<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(result, expected);
    }
}
