//! Runs the blocksweep binary against `sh` stand-in workers
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use blocksweep::{parse_config, to_yaml};
use blocksweep_core::{ParameterGrid, SweepConfig};
use tempfile::tempdir;

/// Prints a header, or one row per combination; writes the question pickle
/// unless stored questions were passed. Exits 3 for threshold FAIL.
const WORKER: &str = r#"for a in "$@"; do case "$a" in --write-csv-column-names) echo limit,threshold; exit 0 ;; --limit=*) l="${a#--limit=}" ;; --tight-threshold=*) t="${a#--tight-threshold=}" ;; --stored-questions=*) s=1 ;; esac; done; [ "$t" = FAIL ] && exit 3; echo "$l,$t"; [ -z "$s" ] && echo "q$l" > Data/questions.pickle; exit 0"#;

fn write_config(root: &Path, thresholds: &[&str]) -> std::path::PathBuf {
    let mut config = SweepConfig::default();
    config.worker.command = vec![
        "sh".to_string(),
        "-c".to_string(),
        WORKER.to_string(),
        "worker".to_string(),
    ];
    config.grid = ParameterGrid::new(
        vec![10, 40],
        thresholds.iter().map(|s| s.to_string()).collect(),
    );
    fs::create_dir_all(root.join("Data")).unwrap();

    let path = root.join("sweep.yaml");
    fs::write(&path, to_yaml(&config).unwrap()).unwrap();
    path
}

fn blocksweep(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_blocksweep"))
        .args(args)
        .current_dir(root)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_print_config_applies_overrides() {
    let dir = tempdir().unwrap();
    let out = blocksweep(
        dir.path(),
        &["--print-config", "--limits", "10,40", "--thresholds", "INVERSE"],
    );

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let config = parse_config(&String::from_utf8(out.stdout).unwrap()).unwrap();
    assert_eq!(config.grid.limits, vec![10, 40]);
    assert_eq!(config.grid.tight_thresholds, vec!["INVERSE"]);
    assert_eq!(config.worker.blocking_method, "canopies");
}

#[test]
fn test_dry_run_prints_plan_only() {
    let dir = tempdir().unwrap();
    let out = blocksweep(
        dir.path(),
        &["--dry-run", "--limits", "10,40", "--thresholds", "INVERSE,INVERSELOG"],
    );

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "python main.py --write-csv-column-names");
    assert_eq!(
        lines[1],
        "python main.py --limit=10 --debug-level=0 --blocking-method=canopies \
         --tight-threshold=INVERSE --output-format=csv"
    );
    assert!(lines[2].contains("--stored-questions=Data/q10.pickle"), "{}", lines[2]);
    assert!(!dir.path().join("Results").exists());
}

#[test]
fn test_sweep_succeeds() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &["INVERSE", "INVERSESQRT"]);

    let out = blocksweep(dir.path(), &["--config", config.to_str().unwrap()]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("Results/canopies.csv")).unwrap(),
        "limit,threshold\n10,INVERSE\n10,INVERSESQRT\n40,INVERSE\n40,INVERSESQRT\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Data/q40.pickle")).unwrap(),
        "q40\n"
    );
}

#[test]
fn test_worker_failure_exits_non_zero() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &["INVERSE", "FAIL"]);

    let out = blocksweep(dir.path(), &["--config", config.to_str().unwrap()]);

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("limit=10, tight-threshold=FAIL"), "{stderr}");
    assert!(stderr.contains("exited with code 3"), "{stderr}");
    assert_eq!(
        fs::read_to_string(dir.path().join("Results/canopies.csv")).unwrap(),
        "limit,threshold\n10,INVERSE\n"
    );
    assert!(!dir.path().join("Data/q40.pickle").exists());
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "paths:\n  cache_file_template: questions.pickle\n").unwrap();

    let out = blocksweep(dir.path(), &["--config", path.to_str().unwrap()]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("{limit}"));
}
