//! Dedupe stage: drop a value equal to the one forwarded immediately before
//! it.
//!
//! Only adjacent repeats are suppressed: `A, B, A` passes through unchanged.

#[derive(Debug, Clone)]
pub struct Dedupe<T> {
    last: Option<T>,
}

impl<T: PartialEq + Clone> Dedupe<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Returns `Some(value)` and remembers it unless it equals the last
    /// forwarded value.
    pub fn admit(&mut self, value: T) -> Option<T> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    /// The last forwarded value.
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Forget the last forwarded value so the next one always passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl<T: PartialEq + Clone> Default for Dedupe<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn run(input: &[&str]) -> Vec<String> {
        let mut dedupe = Dedupe::new();
        input
            .iter()
            .filter_map(|s| dedupe.admit(s.to_string()))
            .collect()
    }

    #[rstest]
    #[case(&["ang", "ang"], &["ang"])]
    #[case(&["a", "b", "a"], &["a", "b", "a"])]
    #[case(&["a", "a", "b", "b", "b", "a"], &["a", "b", "a"])]
    #[case(&[], &[])]
    fn suppresses_adjacent_repeats_only(#[case] input: &[&str], #[case] expected: &[&str]) {
        assert_eq!(run(input), expected);
    }

    #[test]
    fn comparison_is_by_value_and_case_sensitive() {
        assert_eq!(run(&["Ang", "ang"]), ["Ang", "ang"]);
    }

    #[test]
    fn reset_forgets_last_value() {
        let mut dedupe = Dedupe::new();
        assert_eq!(dedupe.admit(1), Some(1));
        assert_eq!(dedupe.last(), Some(&1));
        dedupe.reset();
        assert_eq!(dedupe.admit(1), Some(1));
    }

    proptest! {
        #[test]
        fn never_forwards_equal_neighbours(input in prop::collection::vec(0u8..4, 0..64)) {
            let mut dedupe = Dedupe::new();
            let out: Vec<u8> = input.iter().filter_map(|v| dedupe.admit(*v)).collect();
            prop_assert!(out.windows(2).all(|w| w[0] != w[1]));
        }

        #[test]
        fn forwards_every_change(input in prop::collection::vec(0u8..4, 0..64)) {
            let mut dedupe = Dedupe::new();
            let out: Vec<u8> = input.iter().filter_map(|v| dedupe.admit(*v)).collect();
            let mut expected = input.clone();
            expected.dedup();
            prop_assert_eq!(out, expected);
        }
    }
}
