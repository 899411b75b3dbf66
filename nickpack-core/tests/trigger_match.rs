use nickpack_core::trigger::{sanitize_nickname, CommentEvent, TriggerMatcher};

fn event(post_id: i64, text: &str) -> CommentEvent {
    CommentEvent {
        post_owner_id: -77,
        post_id,
        comment_id: 5001,
        text: text.to_string(),
    }
}

#[test]
fn test_sanitize_strips_forbidden_characters() {
    assert_eq!(sanitize_nickname("Foo<Bar>"), "FooBar");
    assert_eq!(sanitize_nickname(r"a<b>c{d}e(f)g/h\i"), "abcdefghi");
}

#[test]
fn test_sanitize_trims_and_truncates_to_32_chars() {
    assert_eq!(sanitize_nickname("  spaced out  "), "spaced out");
    let long = "x".repeat(50);
    assert_eq!(sanitize_nickname(&long).chars().count(), 32);
}

#[test]
fn test_sanitize_is_idempotent() {
    let inputs = [
        "Foo<Bar>",
        "  padded  ",
        r"we{i}rd/(name)\\",
        "plain",
        "",
        &("y".repeat(33) + "  "),
        "ends with space at 32 chars exactly  ",
    ];
    for input in inputs {
        let once = sanitize_nickname(input);
        assert_eq!(sanitize_nickname(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn test_empty_after_sanitize_is_not_found() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(matcher.extract_nickname("nick: <>"), None);
}

#[test]
fn test_colon_pattern_extracts_and_sanitizes() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(
        matcher.extract_nickname("Nick: Foo<Bar>"),
        Some("FooBar".to_string())
    );
}

#[test]
fn test_space_pattern_and_case_insensitive_label() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(
        matcher.extract_nickname("NICK cool_name"),
        Some("cool_name".to_string())
    );
}

#[test]
fn test_colon_pattern_takes_priority() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(
        matcher.extract_nickname("nick reserve\nnick: primary"),
        Some("primary".to_string())
    );
}

#[test]
fn test_value_terminates_at_end_of_line() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(
        matcher.extract_nickname("nick: hero\nplease and thanks"),
        Some("hero".to_string())
    );
}

#[test]
fn test_no_label_returns_none() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert_eq!(matcher.extract_nickname("no label here"), None);
}

#[test]
fn test_watched_post_comparison_is_string_equality() {
    let matcher = TriggerMatcher::new("123", "nick").unwrap();
    assert!(matcher.matches_post(&event(123, "nick: a")));
    assert!(!matcher.matches_post(&event(124, "nick: a")));
}
