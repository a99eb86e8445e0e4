//! Integration tests for the command-line tool.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn tree_tokens(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tree-tokens"))
        .current_dir(dir)
        .arg("--no-color")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn workspace(source: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sample.py"), source).unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = tree_tokens(dir.path(), &["--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    for command in ["tokens", "nodes", "at", "replace", "check"] {
        assert!(out.contains(command), "missing {command} in:\n{out}");
    }
}

#[test]
fn test_tokens_json() {
    let dir = workspace("a = 1  # one\n");
    let output = tree_tokens(dir.path(), &["tokens", "sample.py", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let tokens: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let kinds: Vec<_> = tokens
        .as_array()
        .unwrap()
        .iter()
        .map(|tok| tok["kind"].as_str().unwrap().to_string())
        .collect();
    // Comment and newline are trivia and hidden by default.
    assert_eq!(kinds, ["NAME", "OP", "NUMBER", "ENDMARKER"]);
    assert_eq!(tokens[2]["text"], "1");
    assert_eq!(tokens[2]["start_pos"]["line"], 1);
    assert_eq!(tokens[2]["start_pos"]["col"], 4);
}

#[test]
fn test_tokens_with_trivia() {
    let dir = workspace("a = 1  # one\n");
    let output = tree_tokens(dir.path(), &["tokens", "sample.py", "--trivia"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("COMMENT"));
    assert!(out.contains("\"# one\""));
    assert!(out.contains("NEWLINE"));
}

#[test]
fn test_tokens_of_type_parameters() {
    let dir = workspace("def f[*Ts](): ...\n");
    let output = tree_tokens(dir.path(), &["tokens", "sample.py", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let tokens: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let texts: Vec<_> = tokens
        .as_array()
        .unwrap()
        .iter()
        .map(|tok| tok["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        texts,
        ["def", "f", "[", "*", "Ts", "]", "(", ")", ":", "...", ""]
    );
}

#[test]
fn test_tokens_reports_syntax_errors() {
    let dir = workspace("def f(:\n");
    let output = tree_tokens(dir.path(), &["tokens", "sample.py"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to tokenize"));
}

#[test]
fn test_nodes_filtered_by_kind() {
    let dir = workspace("foo(bar)\nbaz(1)\n");
    let output = tree_tokens(dir.path(), &["nodes", "sample.py", "-k", "call"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let lines: Vec<_> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines, ["Call 1:0-1:8 foo(bar)", "Call 2:0-2:6 baz(1)"]);
}

#[test]
fn test_nodes_json() {
    let dir = workspace("x = (1,\n     2)\n");
    let output = tree_tokens(dir.path(), &["nodes", "sample.py", "--json", "-k", "tuple"]);
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(rows[0]["kind"], "Tuple");
    assert_eq!(rows[0]["text"], "(1,\n     2)");
    assert_eq!(rows[0]["end"]["line"], 2);
}

#[test]
fn test_nodes_rejects_unknown_kind() {
    let dir = workspace("x\n");
    let output = tree_tokens(dir.path(), &["nodes", "sample.py", "-k", "banana"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("banana"));
}

#[test]
fn test_at_lists_containing_nodes() {
    let dir = workspace("foo(bar)\n");
    let output = tree_tokens(dir.path(), &["at", "sample.py", "1", "4"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let kinds: Vec<_> = stdout(&output)
        .lines()
        .map(|line| line.split_whitespace().next().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        ["Module", "ExpressionStatement", "Call", "ArgumentList", "Identifier"]
    );
}

#[test]
fn test_at_counts_characters() {
    let dir = workspace("s = 'ü' + x\n");
    // Character column 10 is `x`; its byte column is 11.
    let output = tree_tokens(dir.path(), &["at", "sample.py", "1", "10"]);
    assert!(output.status.success());
    let last = stdout(&output).lines().last().unwrap().to_string();
    assert_eq!(last.trim_start(), "Identifier 1:11-1:12 x");
}

#[test]
fn test_at_rejects_bad_line() {
    let dir = workspace("x\n");
    let output = tree_tokens(dir.path(), &["at", "sample.py", "9", "0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("line 9"));
}

#[test]
fn test_replace_prints_result() {
    let dir = workspace("foo(bar)\n");
    let output = tree_tokens(
        dir.path(),
        &["replace", "sample.py", "1", "4", "--with", "baz, qux"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "foo(baz, qux)\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("sample.py")).unwrap(),
        "foo(bar)\n"
    );
}

#[test]
fn test_replace_by_kind_with_diff() {
    let dir = workspace("a = 1\nfoo(bar)\nb = 2\n");
    let output = tree_tokens(
        dir.path(),
        &["replace", "sample.py", "2", "5", "-k", "call", "--with", "go()", "--diff"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("-foo(bar)"));
    assert!(out.contains("+go()"));
    assert!(out.contains(" a = 1"));
}

#[test]
fn test_replace_writes_file() {
    let dir = workspace("x = old\n");
    let output = tree_tokens(
        dir.path(),
        &["replace", "sample.py", "1", "4", "--with", "new", "--write"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        fs::read_to_string(dir.path().join("sample.py")).unwrap(),
        "x = new\n"
    );
}

#[test]
fn test_replace_refuses_broken_result() {
    let dir = workspace("x = old\n");
    let args = ["replace", "sample.py", "1", "4", "--with", "(", "--write"];

    let output = tree_tokens(dir.path(), &args);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--force"));
    assert_eq!(
        fs::read_to_string(dir.path().join("sample.py")).unwrap(),
        "x = old\n"
    );

    let mut forced = args.to_vec();
    forced.push("--force");
    let output = tree_tokens(dir.path(), &forced);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("sample.py")).unwrap(),
        "x = (\n"
    );
}

#[test]
fn test_check_directory() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    fs::create_dir(&pkg).unwrap();
    fs::write(pkg.join("a.py"), "def f(x):\n    return [i for i in x]\n").unwrap();
    fs::write(pkg.join("b.py"), "class C:\n    pass\n").unwrap();
    fs::write(pkg.join("notes.txt"), "not python (").unwrap();

    let output = tree_tokens(dir.path(), &["check", "pkg"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("a.py"));
    assert!(out.contains("b.py"));
    assert!(!out.contains("notes.txt"));
    assert!(out.contains("2 passed"));
}

#[test]
fn test_check_reports_failures() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("good.py"), "x = 1\n").unwrap();
    fs::write(dir.path().join("bad.py"), "def f(:\n").unwrap();

    let output = tree_tokens(dir.path(), &["check", "."]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("bad.py"));
    assert!(stdout(&output).contains("1 passed"));
    assert!(stdout(&output).contains("1 failed"));
}

#[test]
fn test_config_kinds_filter_nodes() {
    let dir = workspace("foo(bar)\n");
    fs::write(
        dir.path().join("tree-tokens.toml"),
        "[output]\nkinds = [\"argumentlist\"]\n",
    )
    .unwrap();
    let output = tree_tokens(dir.path(), &["nodes", "sample.py"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "ArgumentList 1:3-1:8 (bar)");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = workspace("x\n");
    fs::write(
        dir.path().join("tree-tokens.toml"),
        "[output]\ncontext = 5000\n",
    )
    .unwrap();
    let output = tree_tokens(dir.path(), &["tokens", "sample.py"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("context"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = workspace("x\n");
    let output = tree_tokens(dir.path(), &["-c", "missing.toml", "tokens", "sample.py"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing.toml"));
}
