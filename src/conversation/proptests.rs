//! Property-based tests for the sanitizer and history
//!
//! - Marker-free text passes through unchanged
//! - A second pass changes nothing once the first pass left no markers
//! - Asterisks and backticks never survive
//! - Appending never disturbs earlier snapshots

use super::*;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Text that cannot contain any marker
fn arb_marker_free() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,#\n]{0,80}".prop_filter("no double hash", |s| !s.contains("##"))
}

/// Text biased toward marker characters
fn arb_markdownish() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            3 => "[a-zA-Z ]{1,6}",
            1 => Just("*".to_string()),
            1 => Just("**".to_string()),
            1 => Just("#".to_string()),
            1 => Just("##".to_string()),
            1 => Just("`".to_string()),
        ],
        0..20,
    )
    .prop_map(|pieces| pieces.concat())
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    (any::<bool>(), "[a-zA-Z ]{1,20}").prop_map(|(is_user, text)| {
        if is_user {
            Turn::user(text)
        } else {
            Turn::model(text)
        }
    })
}

fn contains_marker(s: &str) -> bool {
    ["**", "##", "`", "*"].iter().any(|m| s.contains(m))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_marker_free_input_is_unchanged(s in arb_marker_free()) {
        prop_assert_eq!(sanitize(&s), s);
    }

    #[test]
    fn prop_idempotent_when_first_pass_is_clean(s in arb_markdownish()) {
        let once = sanitize(&s);
        if !contains_marker(&once) {
            prop_assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn prop_no_asterisk_or_backtick_survives(s in arb_markdownish()) {
        let out = sanitize(&s);
        prop_assert!(!out.contains('*'));
        prop_assert!(!out.contains('`'));
    }

    #[test]
    fn prop_never_grows(s in arb_markdownish()) {
        prop_assert!(sanitize(&s).len() <= s.len());
    }

    #[test]
    fn prop_append_preserves_prefix(
        turns in proptest::collection::vec(arb_turn(), 0..10),
        extra in arb_turn(),
    ) {
        let history: ConversationHistory = turns.iter().cloned().collect();
        let longer = history.appended(extra.clone());

        prop_assert_eq!(history.turns(), turns.as_slice());
        prop_assert_eq!(longer.len(), turns.len() + 1);
        prop_assert_eq!(&longer.turns()[..turns.len()], turns.as_slice());
        prop_assert_eq!(longer.last(), Some(&extra));
    }
}

/// Removing a backtick can join two hashes into a fresh marker; a second
/// pass then strips it. Idempotence only holds for clean first passes.
#[test]
fn joined_markers_need_a_second_pass() {
    let once = sanitize("#`#");
    assert_eq!(once, "##");
    assert_eq!(sanitize(&once), "");
}
