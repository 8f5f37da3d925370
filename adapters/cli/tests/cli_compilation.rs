use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "catacomb"])
        .status()
        .expect("failed to invoke cargo check for catacomb CLI binary");

    assert!(status.success(), "cargo check --bin catacomb should succeed");
}

#[test]
fn short_headless_session_reports_its_counters() {
    let output = Command::new(env!("CARGO_BIN_EXE_catacomb"))
        .args(["--seed", "7", "--ticks", "30", "--assets", "no-such-assets"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run the catacomb binary");

    assert!(output.status.success(), "catacomb exited with {:?}", output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks"), "unexpected summary: {stdout}");
    assert!(stdout.contains("player"), "unexpected summary: {stdout}");
}

#[test]
fn unreadable_config_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_catacomb"))
        .args(["--config", "no/such/catacomb.toml", "--ticks", "1"])
        .output()
        .expect("failed to run the catacomb binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load configuration"),
        "unexpected error output: {stderr}"
    );
}
