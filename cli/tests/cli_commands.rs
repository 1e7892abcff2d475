use std::path::PathBuf;
use std::process::{Command, Output};

fn cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_minigames-cli"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run minigames-cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("minigames-{name}-{}", std::process::id()))
}

#[test]
fn gestures_list_names_every_gesture() {
    let output = cli(&["gestures", "list"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 21);
    assert!(text.contains("swipe-left -> left"));
    assert!(text.contains("hidden-gesture -> i"));
}

#[test]
fn solved_puzzle_snapshot_can_be_inspected() {
    let path = temp_path("snapshot");
    let path_arg = path.to_string_lossy().into_owned();
    let output = cli(&[
        "puzzle", "solve", "--pieces", "9", "--seed", "0x2a", "--save", &path_arg,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("seed: 0x2a"));
    assert!(text.contains("won: true"));
    assert!(text.contains("components: 1"));
    assert!(text.contains("scene: Index(2)"));

    let output = cli(&["puzzle", "inspect", &path_arg]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("grid: 3x3"));
    assert!(text.contains("pieces: 9"));
    assert!(text.contains("won: true"));
    let _ = std::fs::remove_file(path);
}

#[test]
fn non_square_piece_count_is_rejected() {
    let output = cli(&["puzzle", "solve", "--pieces", "10", "--seed", "1"]);
    assert!(!output.status.success());
}

#[test]
fn unknown_picture_falls_back_to_bonobo() {
    let output = cli(&["puzzle", "solve", "--pieces", "9", "--seed", "7", "--picture", "Zebra"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("picture: Bonobo"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown picture Zebra"));
}

#[test]
fn replay_reports_completions() {
    let path = temp_path("trace.ndjson");
    let lines = [
        r#"{"t": 0.0, "joints": {"shoulder_right": [0.25, 1.5, 2.0], "hand_right": [0.25, 1.75, 2.0]}}"#,
        r#"{"t": 0.5, "joints": {"shoulder_right": [0.25, 1.5, 2.0], "hand_right": [0.25, 1.75, 2.0]}}"#,
        r#"{"t": 1.0, "joints": {"shoulder_right": [0.25, 1.5, 2.0], "hand_right": [0.25, 1.75, 2.0]}}"#,
    ];
    std::fs::write(&path, lines.join("\n")).expect("write trace");
    let path_arg = path.to_string_lossy().into_owned();
    let output = cli(&["gestures", "replay", &path_arg, "--gesture", "raise_right_hand"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("raise-right-hand completed"));
    assert!(text.contains("frames: 3 completed: 1"));
    let _ = std::fs::remove_file(path);
}
