//! End-to-end runs of the `ethical-engine` binary with scripted stdin.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const CONFIG: &str = "\
class,gender,age,bodyType,profession,pregnant,isYou,species,isPet,role
scenario:green,,,,,,,,,
person,female,32,athletic,doctor,yes,no,,,pedestrian
animal,unknown,4,,,,,dog,true,passenger
scenario:red,,,,,,,,,
person,male,70,average,,,,,,passenger
person,robot,abc,average,,,,,,pedestrian
scenario:green,,,,,,,,,
person,male,25,overweight,student,,yes,,,passenger
animal,unknown,2,,,,,axolotl,no,pedestrian
";

fn run_engine(args: &[&str], stdin: &str, cwd: &Path) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ethical-engine"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn ethical-engine");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for ethical-engine")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn help_prints_usage_with_received_arguments() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_engine(&["-h"], "", dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage: ethical-engine -h"), "{text}");
    assert!(text.contains("--interactive"));
}

#[test]
fn dangling_config_flag_prints_help() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_engine(&["--config"], "", dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage: ethical-engine --config"));
}

#[test]
fn missing_config_exits_cleanly() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_engine(&["-c", "absent.csv", "-i"], "yes\n", dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("ERROR: could not find config file."));
    assert!(!text.contains("Scenario"));
}

#[test]
fn configured_session_runs_to_completion_and_persists() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("config.csv"), CONFIG).expect("write config");

    let output = run_engine(
        &["-c", "config.csv", "-r", "out/results.log", "-i"],
        "yes\n1\nsomething\n2\npedestrians\n\n",
        dir.path(),
    );

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("WARNING: invalid characteristic in config file in line 6"));
    assert!(text.contains("WARNING: invalid number format in config file in line 6"));
    assert_eq!(text.matches("# Scenario").count(), 3);
    assert!(text.contains("Invalid response. "));
    assert!(text.contains("- % SAVED AFTER 3 RUNS"));
    assert!(text.contains("That's all. Press any key to quit."));

    let results =
        std::fs::read_to_string(dir.path().join("out/results.log")).expect("results written");
    assert_eq!(results.matches("# User Audit").count(), 2);
}

#[test]
fn generated_session_stops_when_operator_declines() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_engine(&["-i"], "no\n1\n2\n1\nno\n", dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.matches("# Scenario").count(), 3);
    assert!(text.contains("- % SAVED AFTER 3 RUNS"));
    assert!(text.contains("Would you like to continue? (yes/no)"));
    assert!(!dir.path().join("results.log").exists());
}

#[test]
fn no_arguments_does_nothing() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = run_engine(&[], "", dir.path());

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
