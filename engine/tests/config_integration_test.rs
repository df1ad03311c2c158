//! Integration tests for configuration management
//!
//! These tests verify that the Config struct can be loaded from disk,
//! validated, and processed with path expansion.

use std::fs;

use adaptive_rag::config::Config;
use adaptive_rag::corpus::Corpus;

fn config_toml(data_dir: &str, extra: &str) -> String {
    format!(
        r#"
[core]
log_level = "debug"
data_dir = "{data_dir}"

[llm]
provider = "gemini"

[llm.gemini]
base_url = "http://localhost:9999/v1beta"
model = "gemini-2.5-pro"
timeout_secs = 30
{extra}
"#
    )
}

#[test]
fn test_load_full_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let corpus_path = dir.path().join("docs.json");

    let contents = config_toml(
        &data_dir.display().to_string(),
        &format!(
            r#"
[pipeline]
max_documents = 5
query_variants = 2
progress_buffer = 16

[corpus]
path = "{}"
"#,
            corpus_path.display()
        ),
    );
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, contents).unwrap();

    let config = Config::load_from_path(&config_path).unwrap();

    assert_eq!(config.core.log_level, "debug");
    assert_eq!(config.llm.gemini.model, "gemini-2.5-pro");
    assert_eq!(config.llm.gemini.timeout_secs, 30);
    assert_eq!(config.pipeline.max_documents, 5);
    assert_eq!(config.pipeline.query_variants, 2);
    assert_eq!(config.pipeline.progress_buffer, 16);
    assert_eq!(config.corpus.path.as_deref(), Some(corpus_path.as_path()));

    // Validation creates the data directory
    assert!(data_dir.is_dir());
}

#[test]
fn test_missing_sections_use_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_toml_str(&format!(
        "[core]\ndata_dir = \"{}\"\n\n[llm]\n",
        dir.path().display()
    ))
    .unwrap();

    assert_eq!(config.core.log_level, "info");
    assert_eq!(
        config.llm.gemini.base_url,
        "https://generativelanguage.googleapis.com/v1beta"
    );
    assert_eq!(config.pipeline.max_documents, 3);
    assert_eq!(config.pipeline.progress_buffer, 100);
    assert!(config.corpus.path.is_none());
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().display().to_string();

    let cases = [
        config_toml(&data_dir, "").replace("\"debug\"", "\"loud\""),
        config_toml(&data_dir, "").replace("\"gemini\"", "\"ollama\""),
        config_toml(&data_dir, "").replace("timeout_secs = 30", "timeout_secs = 0"),
        config_toml(&data_dir, "[pipeline]\nmax_documents = 0\n"),
        config_toml(&data_dir, "[pipeline]\nquery_variants = 11\n"),
        config_toml(&data_dir, "[pipeline]\nprogress_buffer = 0\n"),
    ];

    for contents in cases {
        let err = Config::from_toml_str(&contents).unwrap_err();
        assert!(
            err.to_string().starts_with("Configuration error"),
            "unexpected error: {}",
            err
        );
    }
}

#[test]
fn test_unreadable_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_path(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_configured_corpus_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("docs.toml");
    fs::write(
        &corpus_path,
        r#"
[[documents]]
id = "k1"
source = "Kernel Notes"
content = "The scheduler picks the next runnable task."
"#,
    )
    .unwrap();

    let config = Config::from_toml_str(&config_toml(
        &dir.path().display().to_string(),
        &format!("[corpus]\npath = \"{}\"\n", corpus_path.display()),
    ))
    .unwrap();

    let corpus = Corpus::resolve(config.corpus.path.as_deref(), &config.core.data_dir).unwrap();
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.get("k1").unwrap().source, "Kernel Notes");
}
