use std::io::Write;
use std::time::Duration;

use clap::Parser;
use grid_cli::cli::{Cli, Command, GlobalArgs};
use grid_cli::{FileConfig, Settings};
use grid_logging::{LevelFilter, LogDestination};
use pretty_assertions::assert_eq;

fn no_flags() -> GlobalArgs {
    GlobalArgs {
        config: None,
        api_url: None,
        poll_interval_ms: None,
        log_level: None,
        log_file: None,
    }
}

fn file_with_everything() -> FileConfig {
    FileConfig {
        api_base: Some("http://file.example:9000/api".to_string()),
        poll_interval_ms: Some(3000),
        request_timeout_ms: Some(20_000),
        log_level: Some("debug".to_string()),
    }
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let settings = Settings::resolve(&no_flags(), &FileConfig::default()).unwrap();
    assert_eq!(
        settings.client.api_base().as_str(),
        "http://127.0.0.1:8000/api"
    );
    assert_eq!(settings.client.poll_interval, Duration::from_millis(1500));
    assert_eq!(settings.client.request_timeout, None);
    assert_eq!(settings.log_level, LevelFilter::Warn);
    assert_eq!(settings.log_destination, LogDestination::Terminal);
}

#[test]
fn file_values_override_defaults() {
    let settings = Settings::resolve(&no_flags(), &file_with_everything()).unwrap();
    assert_eq!(
        settings.client.api_base().as_str(),
        "http://file.example:9000/api"
    );
    assert_eq!(settings.client.poll_interval, Duration::from_secs(3));
    assert_eq!(
        settings.client.request_timeout,
        Some(Duration::from_secs(20))
    );
    assert_eq!(settings.log_level, LevelFilter::Debug);
}

#[test]
fn blank_url_flag_falls_back_to_file() {
    let flags = GlobalArgs {
        api_url: Some("   ".to_string()),
        ..no_flags()
    };
    let settings = Settings::resolve(&flags, &file_with_everything()).unwrap();
    assert_eq!(
        settings.client.api_base().as_str(),
        "http://file.example:9000/api"
    );
}

#[test]
fn flags_override_file() {
    let flags = GlobalArgs {
        api_url: Some("http://flag.example/api".to_string()),
        poll_interval_ms: Some(100),
        log_level: Some("trace".to_string()),
        log_file: Some("grid-test.log".into()),
        ..no_flags()
    };
    let settings = Settings::resolve(&flags, &file_with_everything()).unwrap();
    assert_eq!(settings.client.api_base().as_str(), "http://flag.example/api");
    assert_eq!(settings.client.poll_interval, Duration::from_millis(100));
    assert_eq!(settings.log_level, LevelFilter::Trace);
    assert_eq!(
        settings.log_destination,
        LogDestination::Both("grid-test.log".into())
    );
}

#[test]
fn invalid_values_are_reported() {
    let bad_url = GlobalArgs {
        api_url: Some("ftp://example.com".to_string()),
        ..no_flags()
    };
    assert!(Settings::resolve(&bad_url, &FileConfig::default()).is_err());

    let zero_interval = GlobalArgs {
        poll_interval_ms: Some(0),
        ..no_flags()
    };
    assert!(Settings::resolve(&zero_interval, &FileConfig::default()).is_err());

    let bad_level = GlobalArgs {
        log_level: Some("loud".to_string()),
        ..no_flags()
    };
    assert!(Settings::resolve(&bad_level, &FileConfig::default()).is_err());
}

#[test]
fn ron_file_is_loaded_with_missing_fields_defaulted() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"(api_base: Some("http://ron.example/api"), poll_interval_ms: Some(2000))"#
    )
    .unwrap();

    let config = FileConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        FileConfig {
            api_base: Some("http://ron.example/api".to_string()),
            poll_interval_ms: Some(2000),
            request_timeout_ms: None,
            log_level: None,
        }
    );
}

#[test]
fn malformed_ron_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(api_base: ").unwrap();
    let err = FileConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("parsing config file"));
}

#[test]
fn config_flag_reaches_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.ron");
    std::fs::write(&path, r#"(poll_interval_ms: Some(4000))"#).unwrap();

    let cli = Cli::try_parse_from([
        "grid",
        "--config",
        path.to_str().unwrap(),
        "watch",
        "BATCH_1",
    ])
    .unwrap();
    assert!(matches!(cli.command, Command::Watch { ref batch_id } if batch_id == "BATCH_1"));

    let file = FileConfig::load(cli.global.config.as_deref().unwrap()).unwrap();
    let settings = Settings::resolve(&cli.global, &file).unwrap();
    assert_eq!(settings.client.poll_interval, Duration::from_secs(4));
}

#[test]
fn run_agent_takes_an_optional_lead() {
    let cli = Cli::try_parse_from(["grid", "run-agent", "lead_research", "--lead", "L-7"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::RunAgent { ref agent_id, lead: Some(ref lead) }
            if agent_id == "lead_research" && lead == "L-7"
    ));

    let cli = Cli::try_parse_from(["grid", "run-agent", "crm_logger"]).unwrap();
    assert!(matches!(cli.command, Command::RunAgent { lead: None, .. }));
    assert!(matches!(
        Cli::try_parse_from(["grid", "dashboard"]).unwrap().command,
        Command::Dashboard
    ));
}
