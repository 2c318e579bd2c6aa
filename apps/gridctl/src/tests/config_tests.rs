use super::{apply_env_overrides, load_settings, merge_file_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    merge_file_settings(
        &mut settings,
        r#"
viewport_height = 480
history = false

[grid]
paginate = true
page_url = "https://example.com/faq/"
finished_message = "That's all"
"#,
    )
    .expect("merge");

    assert_eq!(settings.viewport_height, 480);
    assert!(!settings.history);
    assert_eq!(settings.columns, Settings::default().columns);
    assert!(settings.grid.paginate);
    assert_eq!(settings.grid.finished_message, "That's all");
    assert_eq!(settings.grid.search_debounce_ms, 200);
}

#[test]
fn env_overrides_accept_renderer_flags() {
    let vars = HashMap::from([
        ("GRIDCTL__PAGINATE", "yes"),
        ("GRIDCTL__IS_HOME", "no"),
        ("GRIDCTL__SEARCH_DEBOUNCE_MS", "350"),
    ]);
    let mut settings = Settings::default();

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()))
        .expect("overrides");

    assert!(settings.grid.paginate);
    assert!(!settings.grid.is_home);
    assert_eq!(settings.grid.search_debounce_ms, 350);
}

#[test]
fn env_override_rejects_bad_flag() {
    let mut settings = Settings::default();
    let err = apply_env_overrides(&mut settings, |key| {
        (key == "GRIDCTL__PAGINATE").then(|| "sometimes".to_string())
    })
    .expect_err("bad flag");
    assert!(err.to_string().contains("GRIDCTL__PAGINATE"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("gridctl_missing_{suffix}.toml"));

    let settings = load_settings(&path).expect("defaults");
    assert_eq!(settings.columns, Settings::default().columns);
}

#[test]
fn malformed_file_is_reported() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("gridctl_bad_{suffix}.toml"));
    fs::write(&path, "columns = \"three\"").expect("write");

    let err = load_settings(&path).expect_err("malformed");
    assert!(err.to_string().contains("invalid settings file"));

    fs::remove_file(path).expect("cleanup");
}
