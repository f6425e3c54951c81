use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn visionloop_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_visionloop").expect("visionloop test binary not built")
}

fn promptloop_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_promptloop").expect("promptloop test binary not built")
}

#[test]
fn visionloop_help_mentions_name() {
    let output = Command::new(visionloop_bin())
        .arg("--help")
        .output()
        .expect("run visionloop --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("VisionLoop"));
}

#[test]
fn visionloop_help_lists_protocol_timeouts() {
    let output = Command::new(visionloop_bin())
        .arg("--help")
        .output()
        .expect("run visionloop --help");
    let combined = combined_output(&output);
    assert!(combined.contains("--ready-timeout-secs"));
    assert!(combined.contains("--completion-timeout-secs"));
    assert!(combined.contains("--poll-interval-ms"));
}

#[test]
fn promptloop_help_mentions_prompt_file() {
    let output = Command::new(promptloop_bin())
        .arg("--help")
        .output()
        .expect("run promptloop --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--prompt-file"));
}

#[test]
fn invalid_timeout_is_rejected_before_startup() {
    let output = Command::new(visionloop_bin())
        .args(["--ready-timeout-secs", "0"])
        .output()
        .expect("run visionloop with bad flag");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--ready-timeout-secs"));
}
