#![allow(dead_code)]

pub mod fake_session;

use std::time::Duration;

use locator_healing::browser::element::ElementAttributes;
use locator_healing::engine::framework::EngineConfig;
use locator_healing::engine::tracker::RacePolicy;
use locator_healing::mapping::row::MappingRow;

/// Build a mapping row with the columns the engine consumes.
pub fn row(step: &str, page: &str, id: &str, css: &str, xpath: &str) -> MappingRow {
    MappingRow {
        step: step.to_string(),
        page: page.to_string(),
        id: id.to_string(),
        class: String::new(),
        name: String::new(),
        value: String::new(),
        xpath_absolute: xpath.to_string(),
        xpath_relative: String::new(),
        css_selector: css.to_string(),
    }
}

/// The canonical submit-button row used across the resolution scenarios.
pub fn submit_row() -> MappingRow {
    let mut r = row(
        "When user clicks Submit button",
        "https://app.example.com/login",
        "submit-btn",
        "#submit-btn",
        "//button[@id='submit-btn']",
    );
    r.class = "submit primary".to_string();
    r
}

/// Attributes of the submit button after a frontend rename: the id drifted
/// but class and text survived.
pub fn renamed_submit_attrs() -> ElementAttributes {
    ElementAttributes {
        id: Some("btn-submit".to_string()),
        tag: Some("button".to_string()),
        class_name: Some("submit primary".to_string()),
        text: Some("Submit".to_string()),
        input_type: Some("submit".to_string()),
        name: None,
        xpath: Some("/html/body/form/button[1]".to_string()),
    }
}

/// An unrelated page element that should never win a heal.
pub fn decoy_attrs() -> ElementAttributes {
    ElementAttributes {
        id: Some("privacy-link".to_string()),
        tag: Some("a".to_string()),
        class_name: None,
        text: Some("Privacy Policy".to_string()),
        input_type: None,
        name: None,
        xpath: Some("/html/footer/a[2]".to_string()),
    }
}

/// Engine settings tuned for tests: no real waiting, screenshots under the
/// system temp dir.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        retry_attempts: 1,
        backoff: Duration::from_millis(1),
        screenshots_dir: std::env::temp_dir().join("locator-healing-tests"),
        race_policy: RacePolicy::TryAll,
    }
}

/// Zero timeout: the race still sweeps every strategy exactly once.
pub fn no_wait() -> Duration {
    Duration::from_millis(0)
}
