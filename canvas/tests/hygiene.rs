//! Hygiene checks over the canvas crate source.
//!
//! Scans production files under `src/` for calls that can crash the studio
//! mid-gesture or swallow an error. Every budget is zero.

use std::fs;
use std::path::Path;

/// `(pattern, why it is banned)`. Counted per line, comments included.
const BANNED: &[(&str, &str)] = &[
    (".unwrap()", "panics"),
    (".expect(", "panics"),
    ("panic!(", "panics"),
    ("unreachable!(", "panics"),
    ("todo!(", "panics"),
    ("unimplemented!(", "panics"),
    ("let _ =", "discards a result unseen"),
    (".ok()", "discards an error unseen"),
    ("#[allow(dead_code)]", "hides unused code"),
    ("println!(", "library output goes through tracing"),
    ("eprintln!(", "library output goes through tracing"),
];

struct SourceFile {
    name: String,
    content: String,
}

fn read_src() -> (Vec<SourceFile>, Vec<SourceFile>) {
    let mut production = Vec::new();
    let mut tests = Vec::new();
    let Ok(entries) = fs::read_dir(Path::new("src")) else {
        return (production, tests);
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.extension().is_none_or(|e| e != "rs") {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let file = SourceFile { name, content };
        if file.name.ends_with("_test.rs") {
            tests.push(file);
        } else {
            production.push(file);
        }
    }
    (production, tests)
}

#[test]
fn production_sources_are_found() {
    let (production, _) = read_src();
    assert!(production.iter().any(|f| f.name == "engine.rs"), "run from the canvas crate root");
}

#[test]
fn banned_patterns_stay_at_zero() {
    let (production, _) = read_src();
    let mut report = Vec::new();
    for (pattern, why) in BANNED {
        for file in &production {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            if count > 0 {
                report.push(format!("  {}: {count}x `{pattern}` ({why})", file.name));
            }
        }
    }
    assert!(report.is_empty(), "banned patterns found:\n{}", report.join("\n"));
}

#[test]
fn every_test_file_is_attached() {
    let (production, tests) = read_src();
    let attached: String = production.iter().map(|f| f.content.as_str()).collect();
    let orphans: Vec<&str> = tests
        .iter()
        .map(|t| t.name.as_str())
        .filter(|name| !attached.contains(&format!("#[path = \"{name}\"]")))
        .collect();
    assert!(orphans.is_empty(), "test files never compiled: {orphans:?}");
}
