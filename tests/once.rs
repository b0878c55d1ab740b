use std::process::Command;

#[test]
fn once_without_repository_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .arg("once")
        .current_dir(dir.path())
        .env("GITHUB_TOKEN", "ghp_test")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no repository configured"), "{stderr}");
}

#[test]
fn once_rejects_malformed_repo_flag() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .args(["once", "--repo", "not-a-repo"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not-a-repo"), "{stderr}");
}

#[test]
fn watch_rejects_zero_interval() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .args(["watch", "--repo", "octocat/hello-world", "--interval", "0"])
        .current_dir(dir.path())
        .env("GITHUB_TOKEN", "ghp_test")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interval"), "{stderr}");
}

#[test]
fn once_rejects_zero_interval_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".prowl.toml"),
        "[github]\nowner = \"octocat\"\nrepo = \"hello-world\"\n\n[poll]\ninterval_secs = 0\n",
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_prowl"))
        .arg("once")
        .current_dir(dir.path())
        .env("GITHUB_TOKEN", "ghp_test")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interval"), "{stderr}");
}
