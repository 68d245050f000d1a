use std::fs;

use fixdelhi::FixdError;
use fixdelhi::cli::RunArgs;
use fixdelhi::cli::commands::run;
use fixdelhi::config::{CliOverrides, Config};

#[test]
fn test_run_reports_failed_commands() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.jsonl");
    fs::write(
        &script,
        "{\"op\":\"vote\",\"issue\":1}\n{\"op\":\"stats\"}\n",
    )
    .unwrap();

    let args = RunArgs {
        script,
        fail_fast: false,
    };
    let config = Config {
        identity: Some("userA".to_string()),
        ..Config::default()
    };

    let result = run::execute(&args, config, &CliOverrides::default(), true);
    match result {
        Err(FixdError::ScriptFailed { failed, total }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 2);
        }
        other => panic!("Expected ScriptFailed, got {other:?}"),
    }
}

#[test]
fn test_run_accepts_sort_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.jsonl");
    fs::write(
        &script,
        "{\"op\":\"query\",\"sort_by\":\"least_voted\"}\n{\"op\":\"stats\",\"sort_by\":\"most\"}\n",
    )
    .unwrap();

    let args = RunArgs {
        script,
        fail_fast: true,
    };
    let result = run::execute(&args, Config::default(), &CliOverrides::default(), false);

    if let Err(e) = result {
        panic!("Expected Ok, got {e:?}");
    }
}
