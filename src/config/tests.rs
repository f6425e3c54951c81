use super::AppConfig;
use clap::Parser;
use std::time::Duration;

fn base_config() -> AppConfig {
    AppConfig::parse_from(["visionloop"])
}

#[test]
fn defaults_validate_cleanly() {
    let mut config = base_config();
    assert!(config.validate().is_ok());
}

#[test]
fn default_timeouts_match_protocol_recommendations() {
    let config = base_config();
    assert_eq!(config.ready_timeout(), Duration::from_secs(60));
    assert_eq!(config.completion_timeout(), Duration::from_secs(45));
    assert_eq!(config.poll_interval(), Duration::from_millis(200));
    assert_eq!(config.read_retries, 3);
}

#[test]
fn zero_ready_timeout_is_rejected() {
    let mut config = base_config();
    config.ready_timeout_secs = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--ready-timeout-secs"));
}

#[test]
fn poll_interval_must_stay_below_completion_budget() {
    let mut config = base_config();
    config.completion_timeout_secs = 1;
    config.poll_interval_ms = 1000;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--poll-interval-ms"));
}

#[test]
fn zero_read_retries_is_rejected() {
    let mut config = base_config();
    config.read_retries = 0;
    assert!(config.validate().is_err());
}

#[test]
fn record_secs_out_of_range_is_rejected() {
    let mut config = base_config();
    config.record_secs = 0;
    assert!(config.validate().is_err());
    config.record_secs = 61;
    assert!(config.validate().is_err());
}

#[test]
fn service_cmd_with_bad_quoting_is_rejected() {
    let mut config = base_config();
    config.service_cmd = "\"unterminated".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--service-cmd"));
}

#[test]
fn empty_service_cmd_is_rejected() {
    let mut config = base_config();
    config.service_cmd = "   ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn service_argv_honors_quoting() {
    let mut config = base_config();
    config.service_cmd = "./demo '10 24' 1024".to_string();
    let argv = config.service_argv().unwrap();
    assert_eq!(argv, vec!["./demo", "10 24", "1024"]);
}

#[test]
fn invalid_ready_phrase_regex_is_rejected() {
    let mut config = base_config();
    config.ready_phrase = "(unclosed".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("--ready-phrase"));
}

#[test]
fn capture_dir_defaults_under_temp() {
    let config = base_config();
    assert!(config.capture_dir().starts_with(std::env::temp_dir()));
}

#[test]
fn prompt_path_defaults_into_ipc_dir() {
    let config = base_config();
    assert_eq!(
        config.prompt_path(),
        config.ipc_dir.join("latest_prompt.txt")
    );
}

#[test]
fn loop_timings_come_from_flags() {
    let config = AppConfig::parse_from([
        "visionloop",
        "--completion-timeout-secs",
        "7",
        "--capture-retry-secs",
        "2",
        "--cycle-delay-secs",
        "1",
    ]);
    let timings = config.loop_timings();
    assert_eq!(timings.completion_timeout, Duration::from_secs(7));
    assert_eq!(timings.capture_retry, Duration::from_secs(2));
    assert_eq!(timings.cycle_delay, Duration::from_secs(1));
}
