use news_core::{ConfigError, CountryPolicy, SyncConfig};

fn temp_file(tag: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "newsfeed_config_{tag}_{}_{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

#[test]
fn defaults_match_the_reader_behaviour() {
    let config = SyncConfig::default();
    assert_eq!(config.page_size, 100);
    assert_eq!(config.batch_size, 6);
    assert_eq!(config.initial_take, 10);
    assert_eq!(config.refill_take, 5);
    assert_eq!(config.interval().as_millis(), 2_000);
    assert!(matches!(config.countries, CountryPolicy::Random { .. }));
    assert!(config.validate().is_ok());
}

#[test]
fn missing_file_yields_defaults() {
    let config = SyncConfig::load(&temp_file("missing")).unwrap();
    assert_eq!(config.batch_size, 6);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let path = temp_file("partial");
    std::fs::write(
        &path,
        r#"{ "batch_size": 3, "countries": { "mode": "fixed", "country": "us" } }"#,
    )
    .unwrap();

    let config = SyncConfig::load(&path).unwrap();

    assert_eq!(config.batch_size, 3);
    assert_eq!(config.page_size, 100);
    assert_eq!(config.countries.pick(), "us");
    let _ = std::fs::remove_file(&path);
}

#[test]
fn saved_config_loads_back() {
    let path = temp_file("save");
    let config = SyncConfig {
        interval_ms: 5_000,
        dedup_on_merge: true,
        ..SyncConfig::default()
    };

    config.save(&path).unwrap();
    let loaded = SyncConfig::load(&path).unwrap();

    assert_eq!(loaded.interval_ms, 5_000);
    assert!(loaded.dedup_on_merge);
    assert_eq!(loaded.countries, config.countries);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn invalid_values_are_rejected() {
    let zero_batch = SyncConfig {
        batch_size: 0,
        ..SyncConfig::default()
    };
    assert!(matches!(zero_batch.validate(), Err(ConfigError::Invalid(_))));

    let bad_scheme = SyncConfig {
        endpoint: "ftp://example.com/headlines".into(),
        ..SyncConfig::default()
    };
    assert!(matches!(bad_scheme.validate(), Err(ConfigError::Invalid(_))));

    let not_a_url = SyncConfig {
        endpoint: "headlines".into(),
        ..SyncConfig::default()
    };
    assert!(matches!(not_a_url.validate(), Err(ConfigError::Url(_))));
}

#[test]
fn malformed_file_is_an_error_for_load_but_not_from_file() {
    let path = temp_file("malformed");
    std::fs::write(&path, "{ nope").unwrap();

    assert!(matches!(SyncConfig::load(&path), Err(ConfigError::Parse(_))));
    assert_eq!(SyncConfig::from_file(&path).batch_size, 6);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn debug_output_hides_the_api_key() {
    let config = SyncConfig {
        api_key: "super-secret".into(),
        ..SyncConfig::default()
    };
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[REDACTED]"));
}

#[test]
fn random_policy_with_empty_list_falls_back() {
    let policy = CountryPolicy::Random {
        countries: Vec::new(),
    };
    assert_eq!(policy.pick(), "us");
}
