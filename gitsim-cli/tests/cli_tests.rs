use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const WORKFLOW: &str = "\
# feature branch and pull request
init demo /tmp/demo
add a.txt hello
commit -m init --author a@x.com
checkout -b feature
add b.txt x
commit -m \"add b\" --author a@x.com

pr create T feature main d
pr review PR-1 r@x.com
pr approve PR-1
pr merge PR-1
log
";

fn gitsim(dir: &TempDir) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("gitsim")?;
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    Ok(cmd)
}

fn script(dir: &TempDir, body: &str) -> Result<std::path::PathBuf, std::io::Error> {
    let path = dir.path().join("script.txt");
    fs::write(&path, body)?;
    Ok(path)
}

#[test]
fn exec_runs_full_workflow() -> TestResult {
    let dir = TempDir::new()?;
    let path = script(&dir, WORKFLOW)?;

    gitsim(&dir)?
        .arg("exec")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created pull request PR-1"))
        .stdout(predicate::str::contains("Added reviewer r@x.com to PR-1"))
        .stdout(predicate::str::contains("Pull request PR-1 is now approved"))
        .stdout(predicate::str::contains("Merged PR-1: main now at"))
        .stdout(predicate::str::contains("add b"));

    Ok(())
}

#[test]
fn missing_config_is_created_with_every_command() -> TestResult {
    let dir = TempDir::new()?;
    let path = script(&dir, "init demo /tmp/demo\n")?;

    gitsim(&dir)?.arg("exec").arg(&path).assert().success();

    let raw = fs::read_to_string(dir.path().join("gitsim_config.json"))?;
    let config: serde_json::Value = serde_json::from_str(&raw)?;
    let enabled = config["enabled_commands"]
        .as_array()
        .ok_or("enabled_commands is not a list")?;
    assert!(enabled.iter().any(|name| name == "commit"));
    assert!(enabled.iter().any(|name| name == "pr"));

    Ok(())
}

#[test]
fn disabled_command_is_rejected() -> TestResult {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("gitsim_config.json"),
        r#"{ "enabled_commands": ["init", "add", "status"] }"#,
    )?;
    let path = script(&dir, "init demo /tmp/demo\nadd a.txt hi\ncommit -m nope\n")?;

    gitsim(&dir)?
        .arg("exec")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[CommandDisabled]"))
        .stderr(predicate::str::contains("stopped at line 3"));

    Ok(())
}

#[test]
fn exec_stops_at_first_failure_unless_keep_going() -> TestResult {
    let dir = TempDir::new()?;
    let path = script(&dir, "status\ninit demo /tmp/demo\n")?;

    gitsim(&dir)?
        .arg("exec")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[NoActiveRepository]"))
        .stdout(predicate::str::contains("Initialized repository").not());

    gitsim(&dir)?
        .arg("exec")
        .arg(&path)
        .arg("--keep-going")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Initialized repository demo"))
        .stderr(predicate::str::contains("1 command(s) failed"));

    Ok(())
}

#[test]
fn json_output_is_structured() -> TestResult {
    let dir = TempDir::new()?;
    let path = script(&dir, "init demo /tmp/demo\nadd a.txt hello\ncommit -m init\n")?;

    gitsim(&dir)?
        .arg("--json")
        .arg("--author")
        .arg("json@x.com")
        .arg("exec")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""kind": "committed""#))
        .stdout(predicate::str::contains(r#""author": "json@x.com""#));

    Ok(())
}

#[test]
fn malformed_config_aborts_startup() -> TestResult {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("gitsim_config.json"), "{ broken")?;

    gitsim(&dir)?
        .arg("config")
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));

    Ok(())
}

#[test]
fn config_disable_persists() -> TestResult {
    let dir = TempDir::new()?;

    gitsim(&dir)?
        .args(["config", "disable", "pr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pr disabled"));

    gitsim(&dir)?
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""pr""#).not())
        .stdout(predicate::str::contains(r#""init""#));

    gitsim(&dir)?
        .args(["config", "enable", "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command 'nonsense'"));

    Ok(())
}

#[test]
fn shell_reads_commands_from_stdin() -> TestResult {
    let dir = TempDir::new()?;

    gitsim(&dir)?
        .write_stdin("init demo /tmp/demo\nbogus\nadd 'a file.txt' \"two words\"\nstatus\nexit\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes to be committed: (1)"))
        .stdout(predicate::str::contains("a file.txt"))
        .stderr(predicate::str::contains("error[UnknownCommand]"));

    Ok(())
}

#[test]
fn help_lists_only_enabled_commands() -> TestResult {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("gitsim_config.json"),
        r#"{ "enabled_commands": ["init", "status"] }"#,
    )?;

    gitsim(&dir)?
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("init <name> <path>"))
        .stdout(predicate::str::contains("commit -m").not());

    Ok(())
}

#[test]
fn log_with_zero_limit_is_not_an_empty_history() -> TestResult {
    let dir = TempDir::new()?;
    let path = script(&dir, "init demo /tmp/demo\nadd a.txt hello\ncommit -m init\nlog -n 0\n")?;

    gitsim(&dir)?
        .arg("exec")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No commits shown (1 in history)"))
        .stdout(predicate::str::contains("No commits yet").not());

    Ok(())
}
