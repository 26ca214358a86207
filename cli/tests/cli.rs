use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const DELIMITER: &str =
    "===============================================================================";

const README: &str = "# Demo

<!-- intro -->

## Usage

```javascript
> S.map(S.inc, [1, 2, 3])
[2, 3, 4]
```

<!-- outro -->
";

fn docpage(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docpage"))
        .args(args)
        .arg("--no-color")
        .current_dir(dir)
        .env_remove("DOCPAGE_LOG")
        .output()
        .expect("failed to run docpage")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A project with a README, both default fragments and a package.json.
fn project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("README.md"), README).unwrap();
    fs::create_dir(dir.path().join("custom")).unwrap();
    fs::write(
        dir.path().join("custom/intro.md"),
        format!("<!-- intro -->\n{}\nWelcome to the *demo*.\n", DELIMITER),
    )
    .unwrap();
    fs::write(
        dir.path().join("custom/outro.md"),
        format!("<!-- outro -->\n{}\nThat's all.\n", DELIMITER),
    )
    .unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "demo", "version": "1.4.2"}"#,
    )
    .unwrap();
    dir
}

#[test]
fn build_writes_the_page() {
    let dir = project();
    let output = docpage(dir.path(), &["README.md"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("index.html"));

    let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("v1.4.2"));
    assert!(html.contains("<p>Welcome to the <em>demo</em>.</p>"));
    assert!(html.contains("<p>That's all.</p>"));
    assert!(html.contains("<div class=\"output\">[2, 3, 4]</div>"));
    assert!(html.contains("<ul id=\"toc\">"));
}

#[test]
fn explicit_build_subcommand() {
    let dir = project();
    let output = docpage(dir.path(), &["build", "README.md", "-o", "out.html"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(dir.path().join("out.html").is_file());
}

#[test]
fn options_before_the_file() {
    let dir = project();
    let output = docpage(dir.path(), &["-o", "out.html", "README.md"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(dir.path().join("out.html").is_file());
}

#[test]
fn missing_argument_exits_with_one() {
    let dir = project();
    let output = docpage(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_document() {
    let dir = project();
    let output = docpage(dir.path(), &["NOPE.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot read 'NOPE.md'"));
}

#[test]
fn fragment_without_delimiter() {
    let dir = project();
    fs::write(dir.path().join("custom/intro.md"), "<!-- intro -->\nno rule here\n").unwrap();
    let output = docpage(dir.path(), &["README.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("expected exactly one delimiter line, found 0"));
    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn fragment_with_two_delimiters() {
    let dir = project();
    fs::write(
        dir.path().join("custom/outro.md"),
        format!("<!-- outro -->\n{d}\nA\n{d}\nB\n", d = DELIMITER),
    )
    .unwrap();
    let output = docpage(dir.path(), &["README.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("found 2"));
}

#[test]
fn placeholder_not_found() {
    let dir = project();
    fs::write(
        dir.path().join("custom/intro.md"),
        format!("<!-- missing -->\n{}\nX\n", DELIMITER),
    )
    .unwrap();
    let output = docpage(dir.path(), &["README.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("placeholder not found"));
}

#[test]
fn malformed_manifest() {
    let dir = project();
    fs::write(dir.path().join("package.json"), "{ not json").unwrap();
    let output = docpage(dir.path(), &["README.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("malformed JSON manifest"));
}

#[test]
fn cargo_manifest() {
    let dir = project();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.9.0\"\n",
    )
    .unwrap();
    let output = docpage(dir.path(), &["README.md", "--manifest", "Cargo.toml"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let html = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(html.contains("v0.9.0"));
}

#[test]
fn config_file_and_flag_precedence() {
    let dir = project();
    fs::write(
        dir.path().join("docpage.toml"),
        "output = \"site.html\"\ntitle = \"From Config\"\n",
    )
    .unwrap();

    let output = docpage(dir.path(), &["README.md"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let html = fs::read_to_string(dir.path().join("site.html")).unwrap();
    assert!(html.contains("<title>From Config</title>"));

    let output = docpage(dir.path(), &["README.md", "--title", "From Flag"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let html = fs::read_to_string(dir.path().join("site.html")).unwrap();
    assert!(html.contains("<title>From Flag</title>"));
}

#[test]
fn malformed_config() {
    let dir = project();
    fs::write(dir.path().join("docpage.toml"), "output = [").unwrap();
    let output = docpage(dir.path(), &["README.md"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid config"));
}

#[test]
fn eval_prints_the_value() {
    let dir = tempfile::tempdir().unwrap();
    let output = docpage(dir.path(), &["eval", "S.add(1)(2)"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "3\n");
}

#[test]
fn eval_errors() {
    let dir = tempfile::tempdir().unwrap();

    let output = docpage(dir.path(), &["eval", "1 +"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("SyntaxError"));

    let output = docpage(dir.path(), &["eval", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ReferenceError: nope is not defined"));
}
