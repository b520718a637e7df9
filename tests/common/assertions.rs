//! Domain-specific assertion helpers for lookahead harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that show the
//! whole event sequence the pipeline delivered.

use lookahead_core::SearchEvent;

/// Terms of every `Results` event, in delivery order.
pub fn result_terms(events: &[SearchEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::Results(set) => Some(set.term.clone()),
            _ => None,
        })
        .collect()
}

/// Terms of every `QueryFailed` event, in delivery order.
pub fn failed_terms(events: &[SearchEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::QueryFailed(failure) => Some(failure.term.clone()),
            _ => None,
        })
        .collect()
}

/// Assert the exact sequence of result-set terms delivered.
///
/// ```rust
/// assert_result_terms!(events, ["Ang"]);
/// ```
#[macro_export]
macro_rules! assert_result_terms {
    ($events:expr, [$($term:expr),* $(,)?]) => {{
        let events: &[lookahead_core::SearchEvent] = &$events;
        let expected: Vec<String> = vec![$($term.to_string()),*];
        let actual = $crate::common::assertions::result_terms(events);
        if actual != expected {
            panic!(
                "assert_result_terms! failed:\n  expected: {:?}\n  actual:   {:?}\n  events:   {:#?}",
                expected, actual, events
            );
        }
    }};
}

/// Assert that no event other than `Results` was delivered.
#[macro_export]
macro_rules! assert_no_failures {
    ($events:expr) => {{
        let events: &[lookahead_core::SearchEvent] = &$events;
        if let Some(bad) = events
            .iter()
            .find(|e| !matches!(e, lookahead_core::SearchEvent::Results(_)))
        {
            panic!("assert_no_failures! failed: unexpected {:?}\n  events: {:#?}", bad, events);
        }
    }};
}
