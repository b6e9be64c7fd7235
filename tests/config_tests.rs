use std::io::Write;
use std::time::Duration;

use reckon::config::ReckonConfig;
use reckon::error::ReckonError;

#[test]
fn loads_a_partial_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
model = "gpt-4o-mini"
port = 9100
max_steps = 4
model_timeout_secs = 15
session_dir = "/var/lib/reckon/sessions"
"#
    )
    .unwrap();

    let config = ReckonConfig::from_file(file.path()).unwrap();
    assert_eq!(config.model(), "gpt-4o-mini");
    assert_eq!(config.port(), 9100);
    assert_eq!(config.max_steps(), 4);
    assert_eq!(config.model_timeout(), Duration::from_secs(15));
    assert_eq!(
        config.session_dir().map(|p| p.to_string_lossy().into_owned()),
        Some("/var/lib/reckon/sessions".to_string())
    );
    // untouched keys keep their defaults
    assert_eq!(config.host(), "localhost");
    assert_eq!(config.tool_timeout(), Duration::from_secs(30));
}

#[test]
fn bad_files_name_the_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let err = ReckonConfig::from_file(file.path()).unwrap_err();
    match err {
        ReckonError::Configuration(msg) => {
            assert!(msg.contains(&file.path().display().to_string()));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReckonConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ReckonError::Io(_)));
}

#[test]
fn zero_limits_in_a_file_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "search_results = 0").unwrap();

    let err = ReckonConfig::from_file(file.path()).unwrap_err();
    match err {
        ReckonError::Configuration(msg) => assert!(msg.contains("search_results")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}
