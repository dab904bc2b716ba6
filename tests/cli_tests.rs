use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("cli").expect("cli binary")
}

fn write_config(dir: &TempDir, output_dir: &str) {
    let config_dir = dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("setup.json"),
        format!(
            r#"{{
                "sprint": {{
                    "name": "2024_S07",
                    "year": "2024",
                    "quarter": "Q1",
                    "start_date": "2024-03-18",
                    "end_date": "2024-03-29",
                    "timezone": "America/Sao_Paulo"
                }},
                "team": "Proj\\Team",
                "devops": {{"organization": "org", "project": "Proj", "token": "pat"}},
                "output_dir": {output_dir:?}
            }}"#
        ),
    )
    .unwrap();
    fs::write(
        config_dir.join("executors.json"),
        r#"{"backend": ["a@x"], "qa": ["q@x"]}"#,
    )
    .unwrap();
    fs::write(
        config_dir.join("dayoffs.json"),
        r#"{"a@x": [{"date": "2024-03-20", "period": "afternoon"}]}"#,
    )
    .unwrap();
    fs::write(
        config_dir.join("dependencies.json"),
        r#"{"dependencies": {"T2": ["T1"]}}"#,
    )
    .unwrap();
}

fn write_items(dir: &TempDir) {
    fs::write(
        dir.path().join("items.json"),
        r#"[
            {"id": "US1", "kind": "user_story", "title": "Checkout flow",
             "area_path": "Proj\\Team"},
            {"id": "T1", "kind": "task", "title": "[BE] build api",
             "state": "new", "original_estimate": 6.0,
             "assigned_to": "a@x", "parent_id": "US1"},
            {"id": "T2", "kind": "task", "title": "[QA] verify checkout",
             "state": "active", "original_estimate": 3.0,
             "assigned_to": "q@x", "parent_id": "US1"},
            {"id": "T3", "kind": "task", "title": "[QA] Plano de Testes",
             "state": "new", "assigned_to": "q@x", "parent_id": "US1"}
        ]"#,
    )
    .unwrap();
}

#[test]
fn help_lists_run_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(str_contains("run"));
}

#[test]
fn missing_config_dir_fails() {
    cli()
        .args(["run", "--config", "no-such-dir"])
        .assert()
        .failure()
        .stderr(str_contains("error"));
}

#[test]
fn offline_run_writes_report_files() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    write_config(&dir, output_dir.to_str().unwrap());
    write_items(&dir);

    cli()
        .args(["run", "--config"])
        .arg(dir.path().join("config"))
        .arg("--items")
        .arg(dir.path().join("items.json"))
        .assert()
        .success()
        .stdout(str_contains("wrote"));

    assert!(output_dir.join("sprint_2024_S07.json").exists());
    assert!(output_dir.join("sprint_2024_S07_stories.csv").exists());
    assert!(output_dir.join("sprint_2024_S07.md").exists());

    let markdown = fs::read_to_string(output_dir.join("sprint_2024_S07.md")).unwrap();
    assert!(markdown.contains("Checkout flow"));
    assert!(markdown.contains("a@x"));
}

#[test]
fn empty_snapshot_still_produces_an_empty_report() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    write_config(&dir, output_dir.to_str().unwrap());
    fs::write(dir.path().join("items.json"), "[]").unwrap();

    // Normalizing an empty snapshot succeeds but produces an empty report;
    // the run still exits 0 because scheduling rejections are not fatal.
    cli()
        .args(["run", "--config"])
        .arg(dir.path().join("config"))
        .arg("--items")
        .arg(dir.path().join("items.json"))
        .assert()
        .success();
}
