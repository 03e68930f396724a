use serde_json::Value;
use std::process::Command;

mod support;
use support::{Workspace, cell_text, read_book};

fn cli_command(args: &[&str]) -> Command {
    let mut command = Command::new(assert_cmd::cargo::cargo_bin!("template-merge"));
    command
        .args(args)
        .env_remove("TEMPLATE_MERGE_CONFIG")
        .env_remove("TEMPLATE_MERGE_TEMPLATE_DIR")
        .env_remove("TEMPLATE_MERGE_INPUT_SOURCE")
        .env_remove("TEMPLATE_MERGE_CSV_DELIMITER");
    command
}

fn run_cli(args: &[&str]) -> std::process::Output {
    cli_command(args).output().expect("run template-merge")
}

fn parse_stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout utf8");
    serde_json::from_str(&stdout).expect("valid json")
}

fn parse_stderr_json(output: &std::process::Output) -> Value {
    let stderr = String::from_utf8(output.stderr.clone()).expect("stderr utf8");
    let last_line = stderr.lines().last().expect("stderr has an envelope");
    serde_json::from_str(last_line).expect("valid json error")
}

#[test]
fn run_with_template_dir_writes_both_outputs() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "run",
        "--profile-data",
        &ws.path_str("profile.csv"),
        "--audit-data",
        &ws.path_str("audit.xlsx"),
        "--template-dir",
        &ws.path_str("templates"),
        "--output-dir",
        &ws.path_str("out"),
        "--date",
        "07032024",
    ]);
    assert!(output.status.success(), "stderr: {:?}", output.stderr);

    let payload = parse_stdout_json(&output);
    assert_eq!(payload["status"], "completed");
    assert_eq!(payload["input_source"], "path");
    assert_eq!(payload["outputs"][0]["dataset"], "profile");
    assert_eq!(payload["outputs"][0]["file_name"], "ProfileData_07032024.xlsx");
    assert_eq!(payload["outputs"][0]["report"]["appended"], 2);
    assert_eq!(payload["outputs"][1]["report"]["formula_columns"][0], "C");
    assert_eq!(
        ws.out_files(),
        vec!["AuditData_07032024.xlsx", "ProfileData_07032024.xlsx"]
    );
}

#[test]
fn run_without_inputs_is_not_ready() {
    let output = run_cli(&["run", "--profile-data", "profile.csv"]);
    assert!(output.status.success());
    let payload = parse_stdout_json(&output);
    assert_eq!(payload["status"], "not_ready");
    let missing: Vec<&str> = payload["missing"]
        .as_array()
        .expect("missing list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(missing, vec!["profile_template", "audit_data", "audit_template"]);
}

#[test]
fn run_dry_run_writes_nothing() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "run",
        "--profile-data",
        &ws.path_str("profile.csv"),
        "--audit-data",
        &ws.path_str("audit.xlsx"),
        "--profile-template",
        &ws.path_str("templates/Profile Data Template.xlsx"),
        "--audit-template",
        &ws.path_str("templates/Audit Data Template.xlsx"),
        "--output-dir",
        &ws.path_str("out"),
        "--dry-run",
        "--compact",
    ]);
    assert!(output.status.success());
    let payload = parse_stdout_json(&output);
    assert_eq!(payload["dry_run"], true);
    assert!(payload["outputs"][0].get("path").is_none());
    assert!(ws.out_files().is_empty());
}

#[test]
fn run_reports_template_not_found() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "run",
        "--profile-data",
        &ws.path_str("profile.csv"),
        "--audit-data",
        &ws.path_str("audit.xlsx"),
        "--template-dir",
        &ws.path_str("out"),
        "--output-dir",
        &ws.path_str("out"),
    ]);
    assert!(!output.status.success());
    let err = parse_stderr_json(&output);
    assert_eq!(err["code"], "TEMPLATE_NOT_FOUND");
    assert!(ws.out_files().is_empty());
}

#[test]
fn run_rejects_malformed_date() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "run",
        "--profile-data",
        &ws.path_str("profile.csv"),
        "--audit-data",
        &ws.path_str("audit.xlsx"),
        "--template-dir",
        &ws.path_str("templates"),
        "--date",
        "2024-03-07",
    ]);
    assert!(!output.status.success());
    let err = parse_stderr_json(&output);
    assert_eq!(err["code"], "INVALID_ARGUMENT");
    assert!(err["try_this"].as_str().expect("hint").contains("DDMMYYYY"));
}

#[test]
fn run_reads_settings_from_config_file() {
    let ws = Workspace::new();
    let config = ws.path("merge.yaml");
    std::fs::write(
        &config,
        format!(
            "template_dir: {:?}\noutput_dir: {:?}\naudit_prefix: Review\n",
            ws.path_str("templates"),
            ws.path_str("out")
        ),
    )
    .expect("write config");

    let output = run_cli(&[
        "--config",
        &config.to_string_lossy(),
        "run",
        "--profile-data",
        &ws.path_str("profile.csv"),
        "--audit-data",
        &ws.path_str("audit.xlsx"),
        "--date",
        "01122025",
    ]);
    assert!(output.status.success(), "stderr: {:?}", output.stderr);
    assert_eq!(
        ws.out_files(),
        vec!["ProfileData_01122025.xlsx", "ReviewData_01122025.xlsx"]
    );
}

#[test]
fn invalid_config_file_is_reported() {
    let ws = Workspace::new();
    let config = ws.path("merge.yaml");
    std::fs::write(&config, "no_such_setting: true\n").expect("write config");
    let output = run_cli(&["--config", &config.to_string_lossy(), "run"]);
    assert!(!output.status.success());
    assert_eq!(parse_stderr_json(&output)["code"], "CONFIG_INVALID");
}

#[test]
fn merge_output_leaves_template_untouched() {
    let ws = Workspace::new();
    let template = ws.path_str("templates/Profile Data Template.xlsx");
    let merged = ws.path_str("out/merged.xlsx");
    let output = run_cli(&[
        "merge",
        &template,
        &ws.path_str("profile.csv"),
        "--output",
        &merged,
    ]);
    assert!(output.status.success(), "stderr: {:?}", output.stderr);

    let payload = parse_stdout_json(&output);
    assert_eq!(payload["mapping"], "positional");
    assert_eq!(payload["mode"], "output");
    assert_eq!(payload["report"]["first_appended_row"], 4);
    assert_eq!(payload["report"]["duplicates"][0], "101");

    let original = read_book(&ws.path("templates/Profile Data Template.xlsx"));
    assert_eq!(original.get_sheet(&0).expect("sheet").get_highest_row(), 3);
    let book = read_book(&ws.path("out/merged.xlsx"));
    assert_eq!(cell_text(book.get_sheet(&0).expect("sheet"), "B5"), "Dee");
}

#[test]
fn merge_reads_csv_delimiter_from_environment() {
    let ws = Workspace::new();
    let data = ws.path("semicolon.csv");
    std::fs::write(&data, "ID;Name;Amount\n101;Ann;10\n105;Eve;50\n").expect("write");
    let output = cli_command(&[
        "merge",
        &ws.path_str("templates/Profile Data Template.xlsx"),
        &data.to_string_lossy(),
        "--dry-run",
    ])
    .env("TEMPLATE_MERGE_CSV_DELIMITER", ";")
    .output()
    .expect("run template-merge");
    assert!(output.status.success(), "stderr: {:?}", output.stderr);

    let payload = parse_stdout_json(&output);
    assert_eq!(payload["report"]["appended"], 1);
    assert_eq!(payload["report"]["appended_keys"][0], "105");
    assert_eq!(payload["report"]["duplicates"][0], "101");
}

#[test]
fn merge_in_place_and_output_conflict() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "merge",
        &ws.path_str("templates/Audit Data Template.xlsx"),
        &ws.path_str("audit.xlsx"),
        "--in-place",
        "--dry-run",
    ]);
    assert!(!output.status.success());
    assert_eq!(parse_stderr_json(&output)["code"], "INVALID_ARGUMENT");
}

#[test]
fn merge_refuses_to_overwrite_without_force() {
    let ws = Workspace::new();
    let existing = ws.path("out/existing.xlsx");
    std::fs::write(&existing, b"keep me").expect("write");
    let output = run_cli(&[
        "merge",
        &ws.path_str("templates/Audit Data Template.xlsx"),
        &ws.path_str("audit.xlsx"),
        "--output",
        &existing.to_string_lossy(),
    ]);
    assert!(!output.status.success());
    assert_eq!(parse_stderr_json(&output)["code"], "INVALID_ARGUMENT");
    assert_eq!(std::fs::read(&existing).expect("read"), b"keep me");
}

#[test]
fn merge_missing_data_file_is_file_not_found() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "merge",
        &ws.path_str("templates/Audit Data Template.xlsx"),
        &ws.path_str("nope.xlsx"),
        "--dry-run",
    ]);
    assert!(!output.status.success());
    assert_eq!(parse_stderr_json(&output)["code"], "FILE_NOT_FOUND");
}

#[test]
fn merge_unreadable_csv_is_input_unreadable() {
    let ws = Workspace::new();
    let data = ws.path("broken.csv");
    std::fs::write(&data, "ID,Name\n1,a,extra\n").expect("write");
    let output = run_cli(&[
        "merge",
        &ws.path_str("templates/Profile Data Template.xlsx"),
        &data.to_string_lossy(),
        "--dry-run",
    ]);
    assert!(!output.status.success());
    assert_eq!(parse_stderr_json(&output)["code"], "INPUT_UNREADABLE");
}

#[test]
fn inspect_reports_template_shape() {
    let ws = Workspace::new();
    let output = run_cli(&[
        "inspect",
        &ws.path_str("templates/Audit Data Template.xlsx"),
    ]);
    assert!(output.status.success());
    let payload = parse_stdout_json(&output);
    assert_eq!(payload["headers"][0]["name"], "Audit ID");
    assert_eq!(payload["headers"][3]["column"], "D");
    assert_eq!(payload["formula_columns"][0], "C");
    assert_eq!(payload["data_rows"], 1);
    assert_eq!(payload["distinct_keys"], 1);
}
