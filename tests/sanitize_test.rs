//! Filename sanitization properties

use tts_runner::synthesis::sanitize_excerpt;

#[test]
fn punctuation_collapses_and_edges_strip() {
    assert_eq!(sanitize_excerpt("Hello, World!!!"), "Hello_World");
}

#[test]
fn non_word_runs_become_single_underscores() {
    assert_eq!(sanitize_excerpt("a  -  b .. c"), "a_b_c");
    assert_eq!(sanitize_excerpt("one/two\\three"), "one_two_three");
}

#[test]
fn idempotent_over_repeated_application() {
    for input in ["Hello, World!!!", "  spaced out  ", "a--b__c", "!!!", ""] {
        let once = sanitize_excerpt(input);
        assert_eq!(sanitize_excerpt(&once), once, "input {:?}", input);
    }
}

#[test]
fn truncates_before_sanitizing() {
    // 30 chars of input, everything after is ignored
    let input = format!("{}!!!rest ignored", "x".repeat(30));
    assert_eq!(sanitize_excerpt(&input), "x".repeat(30));
}

#[test]
fn leading_whitespace_trimmed_first() {
    assert_eq!(sanitize_excerpt("   hello   "), "hello");
}

#[test]
fn all_punctuation_yields_empty_excerpt() {
    assert_eq!(sanitize_excerpt("?!?!?!"), "");
}

#[test]
fn unicode_word_characters_survive() {
    assert_eq!(sanitize_excerpt("héllo wörld"), "héllo_wörld");
}
