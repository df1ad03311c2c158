use adaptive_rag::secrets::{scrub_secrets, SecretManager, SecretString};
use sdk::errors::{EngineError, RagErrorExt};

#[test]
fn test_environment_key_takes_precedence() {
    // Only test in this binary that touches the environment
    std::env::set_var("GEMINI_API_KEY", "  env-key-123  ");

    let manager = SecretManager::new("adaptive-rag-integration-test");
    let key = manager.gemini_api_key().expect("key from environment");
    assert_eq!(key.unsecure(), "env-key-123");

    std::env::remove_var("GEMINI_API_KEY");
}

#[test]
fn test_keychain_round_trip() {
    if std::env::var("CI").is_ok() {
        return; // Skip: no keyring in CI
    }
    let manager = SecretManager::new("adaptive-rag-integration-test");

    if manager.set_secret("test_api_key", "sk-test123456789").is_err() {
        return; // No usable keychain on this machine
    }

    let retrieved = manager
        .get_secret("test_api_key")
        .expect("Failed to retrieve secret")
        .expect("Secret should exist");
    assert_eq!(retrieved.unsecure(), "sk-test123456789");
}

#[test]
fn test_empty_secret_is_rejected() {
    let manager = SecretManager::new("adaptive-rag-integration-test");
    let err = manager.set_secret("test_api_key", "   ").unwrap_err();
    assert!(matches!(err, EngineError::KeyringError(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_gateway_errors_never_leak_keys() {
    let leaked = "request failed: https://host/v1beta/models?key=AIzaSyA1234567890abcdefghijklmnopqrstu";
    let scrubbed = scrub_secrets(leaked);
    assert!(!scrubbed.contains("AIzaSy"));
    assert!(scrubbed.contains("[REDACTED]"));
}

#[test]
fn test_secret_string_is_redacted_when_formatted() {
    let secret = SecretString::new("AIzaSyA1234567890abcdefghijklmnopqrstu");
    assert!(!format!("{:?}", secret).contains("AIza"));
    assert!(!format!("{}", secret).contains("AIza"));
}
