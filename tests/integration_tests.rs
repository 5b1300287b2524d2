//! Integration tests for page-i18n
//!
//! These tests wire the translator to real seams: dictionaries served over
//! HTTP by a mock server or read from disk, HTML documents, and a preference
//! file that outlives the translator.

use page_i18n::config::Config;
use page_i18n::document::{Document, HtmlDocument};
use page_i18n::i18n::LanguageCode;
use page_i18n::Translator;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

// ==================== Test Helpers ====================

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title data-i18n="page.title">Portfolio</title>
</head>
<body>
  <h1 data-i18n="hero.heading">Hi, I build things</h1>
  <p data-i18n="hero.lead">Source lead</p>
  <p data-i18n="footer.note">Source note</p>
  <button id="btn-es">ES</button>
</body>
</html>"#;

const EN: &str = r#"{
  "page.title": "Portfolio <small>2024</small>",
  "hero.heading": "Hi, I build things",
  "hero.lead": "Backend<br>and tooling",
  "only.en": "unused"
}"#;

const ES: &str = r#"{
  "page.title": "Portafolio <small>2024</small>",
  "hero.heading": "Hola, construyo cosas"
}"#;

/// Config serving dictionaries from `base_url` with a preference file in `temp_dir`
fn create_test_config(base_url: Option<&str>, temp_dir: &TempDir) -> Config {
    let mut config =
        Config::new("en", &[("en", "./en.json"), ("es", "./es.json")]).expect("valid config");
    config.base_url = base_url.map(str::to_string);
    config.locale_dir = temp_dir.path().to_path_buf();
    config.preference_file = temp_dir.path().join("prefs").join("preferences.json");
    config.fetch_timeout = Some(Duration::from_secs(2));
    config
}

async fn mount_json(server: &MockServer, route: &str, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn write_locale(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).expect("write locale");
}

fn es() -> LanguageCode {
    LanguageCode::new("es")
}

// ==================== HTTP Workflow Tests ====================

#[tokio::test]
async fn test_http_apply_spanish_end_to_end() {
    let server = MockServer::start().await;
    mount_json(&server, "/es.json", ES, 1).await;
    mount_json(&server, "/en.json", EN, 1).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let config = create_test_config(Some(&server.uri()), &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    let outcome = translator.apply(&es(), &mut doc).await;
    let report = outcome.report().expect("applied");

    assert_eq!(report.translated, 3);
    assert_eq!(report.fallback_keys, vec!["hero.lead"]);
    assert_eq!(report.missing_keys, vec!["footer.note"]);

    let html = doc.render();
    assert!(html.contains(r#"<html lang="es">"#));
    assert!(html.contains(r#"<title data-i18n="page.title">Portafolio 2024</title>"#));
    assert!(html.contains(r#"<h1 data-i18n="hero.heading">Hola, construyo cosas</h1>"#));
    assert!(html.contains(r#"<p data-i18n="hero.lead">Backend<br>and tooling</p>"#));
    assert!(html.contains(r#"<p data-i18n="footer.note">Source note</p>"#));
    assert!(html.contains(r#"<button id="btn-es">ES</button>"#));
}

#[tokio::test]
async fn test_http_apply_default_fetches_once() {
    let server = MockServer::start().await;
    mount_json(&server, "/en.json", EN, 1).await;
    mount_json(&server, "/es.json", ES, 0).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let config = create_test_config(Some(&server.uri()), &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    translator.apply(&LanguageCode::new("en"), &mut doc).await;

    assert_eq!(doc.title(), Some("Portfolio 2024"));
    assert_eq!(doc.language(), Some("en"));
    // MockServer verifies expected call counts on drop
}

#[tokio::test]
async fn test_http_missing_primary_falls_back_to_default() {
    let server = MockServer::start().await;
    mount_json(&server, "/en.json", r#"{"hero.heading": "Hi"}"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/es.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("temp dir");
    let config = create_test_config(Some(&server.uri()), &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    translator.apply(&es(), &mut doc).await;

    assert_eq!(doc.content_of("hero.heading"), Some("Hi"));
    assert_eq!(doc.title(), Some("Portfolio"));
}

#[tokio::test]
async fn test_http_slow_dictionary_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/es.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ES)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_json(&server, "/en.json", EN, 1).await;

    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = create_test_config(Some(&server.uri()), &temp_dir);
    config.fetch_timeout = Some(Duration::from_millis(200));
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    let outcome = translator.apply(&es(), &mut doc).await;

    // Spanish timed out, so everything comes from English
    assert_eq!(doc.content_of("hero.heading"), Some("Hi, I build things"));
    assert_eq!(outcome.report().unwrap().fallback_keys.len(), 3);
}

// ==================== Preference Persistence Tests ====================

#[tokio::test]
async fn test_preference_survives_restart() {
    let temp_dir = TempDir::new().expect("temp dir");
    write_locale(temp_dir.path(), "en.json", EN);
    write_locale(temp_dir.path(), "es.json", ES);
    let config = create_test_config(None, &temp_dir);

    {
        let translator = Translator::from_config(&config).expect("translator");
        assert_eq!(translator.resolve_initial_language(None).as_str(), "en");

        let mut doc = HtmlDocument::parse(PAGE);
        translator.apply(&es(), &mut doc).await;
        assert_eq!(doc.language(), Some("es"));
    }

    let restarted = Translator::from_config(&config).expect("translator");
    assert_eq!(restarted.resolve_initial_language(Some("en-US")), es());

    let saved = std::fs::read_to_string(&config.preference_file).expect("preference file");
    assert!(saved.contains(r#""lang": "es""#));
}

#[tokio::test]
async fn test_locale_hint_used_without_preference() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = create_test_config(None, &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    assert_eq!(translator.resolve_initial_language(Some("es-ES")), es());
    assert_eq!(
        translator.resolve_initial_language(Some("fr-FR")).as_str(),
        "en"
    );
}

#[tokio::test]
async fn test_unrecognized_saved_preference_is_ignored() {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = create_test_config(None, &temp_dir);
    std::fs::create_dir_all(config.preference_file.parent().unwrap()).expect("mkdir");
    std::fs::write(&config.preference_file, r#"{"lang": "fr"}"#).expect("write");

    let translator = Translator::from_config(&config).expect("translator");
    assert_eq!(translator.resolve_initial_language(Some("es-ES")), es());
    assert_eq!(translator.resolve_initial_language(None).as_str(), "en");
}

// ==================== Filesystem Workflow Tests ====================

#[tokio::test]
async fn test_file_apply_is_idempotent() {
    let temp_dir = TempDir::new().expect("temp dir");
    write_locale(temp_dir.path(), "en.json", EN);
    write_locale(temp_dir.path(), "es.json", ES);
    let config = create_test_config(None, &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    translator.apply(&es(), &mut doc).await;
    let first = doc.render();

    translator.apply(&es(), &mut doc).await;
    assert_eq!(doc.render(), first);

    // Re-rendering from the already translated page converges too
    let mut reparsed = HtmlDocument::parse(first.clone());
    translator.apply(&es(), &mut reparsed).await;
    assert_eq!(reparsed.render(), first);
}

#[tokio::test]
async fn test_file_malformed_dictionary_keeps_source_content() {
    let temp_dir = TempDir::new().expect("temp dir");
    write_locale(temp_dir.path(), "en.json", "{ this is not json");
    let config = create_test_config(None, &temp_dir);
    let translator = Translator::from_config(&config).expect("translator");

    let mut doc = HtmlDocument::parse(PAGE);
    let outcome = translator.apply(&LanguageCode::new("en"), &mut doc).await;

    assert_eq!(outcome.report().unwrap().missing_keys.len(), 4);
    assert_eq!(doc.render(), PAGE);
}
