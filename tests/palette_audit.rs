//! Keeps terminal colors flowing through `src/palette.rs`.
//!
//! Named ANSI colors and inline RGB values render differently per terminal
//! theme; the portal palette is the only place colors are defined.

use std::fs;
use std::path::Path;

const DISALLOWED: &[&str] = &[
    ".red()",
    ".green()",
    ".yellow()",
    ".blue()",
    ".cyan()",
    ".magenta()",
    "Color::Red",
    "Color::Green",
    "Color::Yellow",
    "Color::Blue",
    "Color::Cyan",
    "Color::Magenta",
    "Color::Rgb(",
];

fn collect_rust_files(dir: &Path, files: &mut Vec<std::path::PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect_rust_files(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

#[test]
fn colors_come_from_the_palette() {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut files = Vec::new();
    collect_rust_files(&src, &mut files);
    assert!(!files.is_empty(), "no sources found under {}", src.display());

    let mut violations = Vec::new();
    for path in files {
        if path.file_name().is_some_and(|name| name == "palette.rs") {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (number, line) in content.lines().enumerate() {
            if let Some(pattern) = DISALLOWED.iter().find(|p| line.contains(*p)) {
                violations.push(format!("{}:{}: {pattern}", path.display(), number + 1));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "direct color usage outside palette.rs:\n{}",
        violations.join("\n")
    );
}

#[test]
fn status_colors_keep_their_roles() {
    let palette = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/palette.rs");
    let content = fs::read_to_string(&palette).expect("read palette.rs");

    for expected in [
        "pub const STATUS_ERROR: Color = RED;",
        "pub const STATUS_WARNING: Color = ORANGE;",
        "pub const STATUS_INFO: Color = BLUE;",
        "pub const TEXT_PRIMARY: Color = SNOW;",
    ] {
        assert!(content.contains(expected), "palette.rs lost `{expected}`");
    }
}
