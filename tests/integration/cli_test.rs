use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn run_cubesearch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cubesearch"))
        .args(args)
        .output()
        .expect("Failed to execute cubesearch")
}

fn assert_success(output: &Output) -> String {
    if !output.status.success() {
        panic!(
            "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_solve_scramble() {
    let output = run_cubesearch(&["solve", "--size", "3", "--scramble", "0 0 0", "-j", "2"]);
    let stdout = assert_success(&output);

    assert!(stdout.contains("Rubik's Cube Solved!"), "stdout: {}", stdout);
    assert!(stdout.contains("Solution Steps:"));
    assert!(stdout.contains("Step 1: Rotate face 0 LEFT"));
    assert!(!stdout.contains("Step 2:"));
    assert!(stdout.contains("Execution Time:"));
    assert!(stdout.contains("States expanded:"));
}

#[test]
fn test_even_cube_labels_right() {
    let output = run_cubesearch(&["solve", "-n", "2", "--scramble", "4,4,4", "-j", "1"]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("RIGHT"), "stdout: {}", stdout);
    assert!(!stdout.contains("LEFT"));
}

#[test]
fn test_solve_with_several_processes() {
    let output = run_cubesearch(&[
        "solve", "-n", "3", "--scramble", "2 2 2 5 5 5", "-j", "2", "--processes", "3",
    ]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("3 process(es)"));
    assert!(stdout.contains("Step 2:"));
    assert!(!stdout.contains("Step 3:"));
}

#[test]
fn test_solve_cube_file() {
    let path: PathBuf = std::env::temp_dir().join(format!("cubesearch-{}.txt", std::process::id()));
    let mut text = String::from("# solved 2x2x2\n");
    for face in ["WHITE", "YELLOW", "RED", "ORANGE", "GREEN", "BLUE"] {
        text.push_str(&format!("{0} {0}\n{0} {0}\n", face));
    }
    fs::write(&path, text).unwrap();

    let output = run_cubesearch(&[
        "solve",
        "-n",
        "2",
        "--cube-file",
        path.to_str().unwrap(),
        "--show-cube",
    ]);
    let _ = fs::remove_file(&path);
    let stdout = assert_success(&output);

    assert!(stdout.contains("Initial cube:"));
    assert!(stdout.contains("Face 5:"));
    assert!(stdout.contains("Already solved."));
}

#[test]
fn test_random_scramble_is_reproducible() {
    let args = ["solve", "-n", "2", "--random-scramble", "2", "--seed", "11", "-j", "2"];
    let first = assert_success(&run_cubesearch(&args));
    let second = assert_success(&run_cubesearch(&args));

    let scramble = |stdout: &str| {
        stdout
            .lines()
            .find(|line| line.starts_with("Scramble"))
            .map(str::to_string)
    };
    assert!(scramble(&first).is_some());
    assert_eq!(scramble(&first), scramble(&second));
}

#[test]
fn test_invalid_input_fails() {
    let output = run_cubesearch(&["solve", "--size", "0", "--scramble", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));

    let output = run_cubesearch(&["solve", "--size", "3", "--scramble", "0 9"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid move '9'"));

    let output = run_cubesearch(&["solve", "--size", "3"]);
    assert!(!output.status.success());
}

#[test]
fn test_depth_limit_reports_unsolved() {
    let output = run_cubesearch(&[
        "solve", "-n", "3", "--scramble", "0", "--max-depth", "2", "-j", "2",
    ]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("Rubik's Cube cannot be solved."));
    assert!(stdout.contains("Termination: depth limit"));
}
