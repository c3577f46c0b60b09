//! Rolling file output configured from TOML.

use logbridge::{LogConfig, Logger, LoggingError, with_level, with_target};
use logbridge_test::Record;
use serde_json::Value;

fn read_records(dir: &std::path::Path, prefix: &str) -> Vec<Record> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if name.starts_with(prefix) {
            let text = std::fs::read_to_string(&path).unwrap();
            records.extend(text.lines().filter_map(Record::parse));
        }
    }
    records
}

#[test]
fn test_file_logging_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");
    let config = LogConfig::from_toml_str(&format!(
        r#"
        level = "warn"
        timestamps = false

        [target]
        file = {logs:?}

        [file]
        prefix = "svc"
        rotation = "never"
        "#
    ))
    .unwrap();

    let logger = Logger::with_options(config.into_options()).unwrap();
    logger.info().msg("filtered");
    logger.warn().str("disk", "sda").msg("almost full");
    drop(logger);

    let records = read_records(&logs, "svc");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message(), Some("almost full"));
    assert_eq!(records[0].field("disk"), Some(&Value::from("sda")));
}

#[test]
fn test_failed_target_keeps_other_options() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let bogus = logbridge::LogTarget::File(file.path().join("logs"));

    let mut builder = Logger::builder();
    let err = builder
        .apply([with_target(bogus), with_level(logbridge::Level::ERROR)])
        .unwrap_err();

    assert!(matches!(err, LoggingError::ConfigError(_)));
    assert_eq!(builder.level(), logbridge::Level::ERROR);
}
