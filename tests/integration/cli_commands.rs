#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    edges: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new(edges_csv: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let edges = dir.path().join("edges.csv");
        fs::write(&edges, edges_csv).expect("write edges");
        let config = dir.path().join("cli.toml");
        fs::write(&config, "").expect("write config");
        Self { dir, edges, config }
    }

    fn scenario_a() -> Self {
        Self::new("from,to,capacity\nA,B,3\nA,C,2\nB,D,2\nC,D,3\n")
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Binary isolated from the user's own config file.
    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("dinitz");
        cmd.env("DINITZ_CONFIG", &self.config);
        cmd
    }
}

#[test]
fn max_flow_emits_json_report() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .args(["--format", "json", "max-flow"])
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["max_flow"].as_f64(), Some(4.0));
    let edges = json["edges"].as_array().expect("edges array");
    assert_eq!(edges.len(), 4);
    assert_eq!(edges[0]["from"], "A");
    assert_eq!(edges[0]["to"], "B");
    assert_eq!(edges[0]["flow"].as_f64(), Some(2.0));
}

#[test]
fn max_flow_text_lists_edges() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .arg("max-flow")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("max flow 4\n"), "{text}");
    assert!(text.contains("A -> C: 2 / 2"), "{text}");
}

#[test]
fn check_passes_for_connected_terminals() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .args(["--format", "json", "check"])
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["ok"], true);
}

#[test]
fn check_reports_precheck_failures_with_exit_code_two() {
    let fx = Fixture::scenario_a();
    let cases: [(&[&str], &str); 3] = [
        (&["--source", "A"], "Please set both a source and a sink."),
        (&["--source", "A", "--sink", "A"], "Source and sink must be different."),
        (&["--source", "D", "--sink", "A"], "No path exists from source to sink."),
    ];
    for (args, message) in cases {
        let output = fx
            .cmd()
            .args(["--format", "json", "check"])
            .arg(&fx.edges)
            .args(args)
            .assert()
            .code(2)
            .get_output()
            .stdout
            .clone();
        let json: Value = serde_json::from_slice(&output).expect("valid json");
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], message);
    }
}

#[test]
fn unknown_terminal_is_treated_as_missing() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .arg("check")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "nowhere"])
        .assert()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Please set both a source and a sink."), "{text}");
}

#[test]
fn run_streams_json_events_then_outcome() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .args(["--format", "json", "run"])
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D", "--delay-ms", "0"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    let outcome = lines.last().expect("outcome line");
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["max_flow"].as_f64(), Some(4.0));
    assert_eq!(outcome["steps"].as_u64(), Some(lines.len() as u64 - 1));
    assert_eq!(lines[0]["type"], "phase");
    assert_eq!(lines[lines.len() - 2]["message"], "Done. maxflow = 4");
}

#[test]
fn run_text_uses_csv_ids() {
    let fx = Fixture::scenario_a();
    let output = fx
        .cmd()
        .arg("run")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D", "--delay-ms", "0", "--color", "never"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("levels: A=0 B=1 C=1 D=2"), "{text}");
    assert!(text.contains("edge A->B dfs"), "{text}");
    assert!(text.contains("max flow 4"), "{text}");
    assert!(!text.contains('\u{1b}'), "no ANSI escapes expected: {text}");
}

#[test]
fn run_honors_config_file() {
    let fx = Fixture::scenario_a();
    fs::write(
        &fx.config,
        "[output]\nformat = \"json\"\n\n[playback]\ndelay_ms = 0\n",
    )
    .unwrap();
    let output = fx
        .cmd()
        .arg("run")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let first: Value = serde_json::from_str(text.lines().next().unwrap()).expect("json");
    assert_eq!(first["name"], "BFS");
}

#[test]
fn invalid_config_value_fails() {
    let fx = Fixture::scenario_a();
    fs::write(&fx.config, "[output]\ncolor = \"sometimes\"\n").unwrap();
    let output = fx
        .cmd()
        .arg("check")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("output.color"), "{text}");
}

#[test]
fn missing_explicit_config_fails() {
    let fx = Fixture::scenario_a();
    fx.cmd()
        .arg("--config")
        .arg(fx.path().join("absent.toml"))
        .arg("check")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "D"])
        .assert()
        .code(1);
}

#[test]
fn malformed_csv_fails() {
    let fx = Fixture::new("from,to,capacity\nA,B,-4\n");
    let output = fx
        .cmd()
        .arg("max-flow")
        .arg(&fx.edges)
        .args(["--source", "A", "--sink", "B"])
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("capacity must be a non-negative number"), "{text}");
}

#[test]
fn phase_cap_reports_partial_flow_as_stopped() {
    // Two phases: s-t directly, then s-a-b-t.
    let fx = Fixture::new("from,to,capacity\ns,t,1\ns,a,1\na,b,1\nb,t,1\n");
    let run = |format: &str| {
        fx.cmd()
            .args(["--format", format, "run"])
            .arg(&fx.edges)
            .args(["--source", "s", "--sink", "t", "--delay-ms", "0"])
            .args(["--max-phases", "1", "--color", "never"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    let text = String::from_utf8(run("json")).unwrap();
    let outcome: Value = serde_json::from_str(text.lines().last().unwrap()).expect("json");
    assert_eq!(outcome["status"], "stopped");
    assert_eq!(outcome["flow"].as_f64(), Some(1.0));
    assert!(outcome.get("max_flow").is_none());

    let text = String::from_utf8(run("text")).unwrap();
    assert!(text.contains("Stopped after 1 phases. flow = 1"), "{text}");
    assert!(text.contains("phase cap reached, flow 1 is not maximal"), "{text}");
    assert!(!text.contains("max flow"), "{text}");
}
