//! Environment handling lives in its own test binary: the process environment
//! is shared by every test in a binary.

use std::time::Duration;

use clap::Parser;
use grid_cli::cli::Cli;
use grid_cli::{FileConfig, Settings};
use pretty_assertions::assert_eq;

fn file_config() -> FileConfig {
    FileConfig {
        api_base: Some("http://file.example:9000/api".to_string()),
        poll_interval_ms: Some(3000),
        ..FileConfig::default()
    }
}

fn settings_for(argv: &[&str]) -> Settings {
    let cli = Cli::try_parse_from(argv).unwrap();
    Settings::resolve(&cli.global, &file_config()).unwrap()
}

#[test]
fn environment_sits_between_flags_and_file() {
    std::env::set_var("GRID_API_URL", "https://env.example/api/");
    std::env::set_var("GRID_POLL_INTERVAL_MS", "750");

    let settings = settings_for(&["grid", "filters"]);
    assert_eq!(settings.client.api_base().as_str(), "https://env.example/api");
    assert_eq!(settings.client.poll_interval, Duration::from_millis(750));

    let settings = settings_for(&[
        "grid",
        "--api-url",
        "http://flag.example/api",
        "--poll-interval-ms",
        "100",
        "filters",
    ]);
    assert_eq!(settings.client.api_base().as_str(), "http://flag.example/api");
    assert_eq!(settings.client.poll_interval, Duration::from_millis(100));

    std::env::set_var("GRID_POLL_INTERVAL_MS", "soon");
    assert!(Cli::try_parse_from(["grid", "filters"]).is_err());

    // Empty variables count as unset.
    std::env::set_var("GRID_API_URL", "");
    std::env::set_var("GRID_POLL_INTERVAL_MS", "");
    let settings = settings_for(&["grid", "filters"]);
    assert_eq!(
        settings.client.api_base().as_str(),
        "http://file.example:9000/api"
    );
    assert_eq!(settings.client.poll_interval, Duration::from_secs(3));

    std::env::remove_var("GRID_API_URL");
    std::env::remove_var("GRID_POLL_INTERVAL_MS");
}
