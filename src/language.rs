// Language tags: maps source file extensions to the tags the judge accepts
// and gives each tag a human readable name.

use std::path::Path;

/// Language tag used when nothing better is known (stdin input, unknown
/// extension).
pub const DEFAULT: &str = "cpp20";

/// Judge language tag for a source file, based on its extension.
pub fn infer(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let tag = match ext.as_str() {
        "cpp" | "cc" | "cxx" => "cpp20",
        "c" => "c",
        "py" => "python",
        "js" => "javascript",
        "go" => "go",
        "java" => "java",
        "rs" => "rust",
        "cs" => "csharp",
        _ => return None,
    };
    Some(tag)
}

/// Human readable name for the tags `infer` produces.
pub fn display_name(tag: &str) -> &str {
    match tag {
        "cpp20" => "C++ 20",
        "c" => "C",
        "python" => "Python",
        "javascript" => "JavaScript",
        "go" => "Go",
        "java" => "Java",
        "rust" => "Rust",
        "csharp" => "C#",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_extension() {
        assert_eq!(infer(Path::new("sol.cpp")), Some("cpp20"));
        assert_eq!(infer(Path::new("sol.cxx")), Some("cpp20"));
        assert_eq!(infer(Path::new("dir/main.rs")), Some("rust"));
        assert_eq!(infer(Path::new("Main.JAVA")), Some("java"));
        assert_eq!(infer(Path::new("a.cs")), Some("csharp"));
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(infer(Path::new("solution.kt")), None);
        assert_eq!(infer(Path::new("Makefile")), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name(DEFAULT), "C++ 20");
        assert_eq!(display_name("pascal"), "pascal");
    }
}
