use nickpack::load_config::{load_config, REPLY_TOKEN_VAR, UPLOAD_TOKEN_VAR};
use serial_test::serial;
use std::io::Write;

const FULL_CONFIG: &str = r#"
watch:
  post_id: "123"
  label: nick
api:
  base_url: "https://api.example.com/method"
  group_id: 4242
assets:
  dir: assets
pacing:
  min_ms: 10
  max_ms: 20
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn set_tokens() {
    std::env::set_var(UPLOAD_TOKEN_VAR, "upload-secret");
    std::env::set_var(REPLY_TOKEN_VAR, "reply-secret");
}

#[test]
#[serial]
fn test_load_config_injects_env_tokens() {
    set_tokens();
    let file = write_config(FULL_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.watch.post_id, "123");
    assert_eq!(config.watch.label, "nick");
    assert_eq!(config.api.base_url, "https://api.example.com/method");
    assert_eq!(config.api.group_id, 4242);
    assert_eq!(config.pacing.min_ms, 10);
    assert_eq!(config.pacing.max_ms, 20);
    assert_eq!(config.upload_token, "upload-secret");
    assert_eq!(config.reply_token, "reply-secret");
}

#[test]
#[serial]
fn test_defaults_apply_when_sections_are_sparse() {
    set_tokens();
    let file = write_config(
        r#"
watch:
  post_id: "9"
api:
  base_url: "https://api.example.com/method"
  group_id: 1
assets:
  dir: assets
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.watch.label, "nick");
    assert_eq!(config.api.version, "5.131");
    assert_eq!(config.api.poll_wait_secs, 25);
    // Default pacing bounds are the tuned production values.
    assert_eq!(config.pacing.min_ms, 1000);
    assert_eq!(config.pacing.max_ms, 3000);
}

#[test]
#[serial]
fn test_missing_token_fails_loading() {
    std::env::remove_var(UPLOAD_TOKEN_VAR);
    std::env::set_var(REPLY_TOKEN_VAR, "reply-secret");
    let file = write_config(FULL_CONFIG);
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains(UPLOAD_TOKEN_VAR));
}

#[test]
#[serial]
fn test_inverted_pacing_bounds_fail_loading() {
    set_tokens();
    let file = write_config(
        r#"
watch:
  post_id: "123"
api:
  base_url: "https://api.example.com/method"
  group_id: 1
assets:
  dir: assets
pacing:
  min_ms: 50
  max_ms: 10
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("pacing"));
}

#[test]
#[serial]
fn test_unreadable_config_fails_loading() {
    set_tokens();
    let err = load_config("definitely/not/a/config.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
