//! Hidden file name matching.
//!
//! User patterns are classified once into exact lookups (names, paths, extensions) and globs, so
//! the common case of a plain name or extension costs a set lookup per file.
//!
//! Name globs are also tried against the bare extension as a last resort. `b*` therefore hides
//! `report.base` through its `base` extension, not only files whose name starts with `b`. Use an
//! extension-anchored pattern such as `b*.md` when that is not wanted.

use std::collections::HashSet;

use crate::glob::Glob;
use crate::vault_path::{VaultPath, normalize_path};

/// How a single file pattern is matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilePatternKind {
    /// No `/`, no `*`, not an extension: `archive`. Matches the file name or its basename.
    LiteralName(String),

    /// Contains `/` but no `*`: `/root/archive.md`. Matches the whole vault path.
    LiteralPath(String),

    /// Starts with a dot, no `/` or `*`: `.pdf`. Matches the extension.
    LiteralExtension(String),

    /// Contains `*` but no `/`: `*.bak`, `draft-*`.
    NameGlob(Glob),

    /// Contains both `*` and `/`: `/templates/*.md`.
    PathGlob(Glob),
}

impl FilePatternKind {
    /// Classify a raw user pattern. Returns `None` for blank input.
    pub fn classify(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return None;
        }

        let has_slash = pattern.contains('/');
        Some(if pattern.contains('*') {
            if has_slash {
                FilePatternKind::PathGlob(Glob::compile(pattern.trim_start_matches('/')))
            } else {
                FilePatternKind::NameGlob(Glob::compile(&pattern))
            }
        } else if has_slash {
            let path = normalize_path(&pattern);
            if path.is_empty() {
                return None;
            }
            FilePatternKind::LiteralPath(path)
        } else if pattern.len() > 1 && pattern.starts_with('.') {
            FilePatternKind::LiteralExtension(pattern[1..].to_string())
        } else {
            FilePatternKind::LiteralName(pattern)
        })
    }
}

/// Compiled matcher over a set of hidden file name patterns.
///
/// Build these through [`MatcherCache::file_name_matcher`](crate::MatcherCache::file_name_matcher)
/// to avoid recompiling on every filter pass.
#[derive(Clone, Debug, Default)]
pub struct HiddenFileNameMatcher {
    literal_names: HashSet<String>,
    literal_paths: HashSet<String>,
    literal_extensions: HashSet<String>,
    name_globs: Vec<Glob>,
    path_globs: Vec<Glob>,
}

impl HiddenFileNameMatcher {
    /// Compile a matcher from raw user patterns. Blank patterns are ignored.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut this = Self::default();
        for pattern in patterns {
            match FilePatternKind::classify(pattern.as_ref()) {
                Some(FilePatternKind::LiteralName(name)) => {
                    this.literal_names.insert(name);
                }
                Some(FilePatternKind::LiteralPath(path)) => {
                    this.literal_paths.insert(path);
                }
                Some(FilePatternKind::LiteralExtension(ext)) => {
                    this.literal_extensions.insert(ext);
                }
                Some(FilePatternKind::NameGlob(glob)) => this.name_globs.push(glob),
                Some(FilePatternKind::PathGlob(glob)) => this.path_globs.push(glob),
                None => (),
            }
        }
        this
    }

    /// Whether this matcher can match anything at all.
    pub fn is_empty(&self) -> bool {
        self.literal_names.is_empty()
            && self.literal_paths.is_empty()
            && self.literal_extensions.is_empty()
            && self.name_globs.is_empty()
            && self.path_globs.is_empty()
    }

    /// Check whether the file at `path` is hidden by any pattern.
    pub fn matches<T: AsRef<str>>(&self, path: T) -> bool {
        self.matches_do(path.as_ref())
    }

    fn matches_do(&self, path: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let normalized = normalize_path(path);
        let file = VaultPath::new(&normalized);
        let name = file.name();
        let basename = file.basename();
        let extension = file.extension();

        if self.literal_names.contains(name)
            || self.literal_names.contains(basename)
            || self.literal_paths.contains(file.as_str())
            || (!extension.is_empty() && self.literal_extensions.contains(extension))
        {
            return true;
        }

        if self
            .name_globs
            .iter()
            .any(|glob| glob.matches(name) || glob.matches(basename))
        {
            return true;
        }

        if self.path_globs.iter().any(|glob| glob.matches(file.as_str())) {
            return true;
        }

        !extension.is_empty() && self.name_globs.iter().any(|glob| glob.matches(extension))
    }
}

#[test]
fn test_classification() {
    assert_eq!(
        FilePatternKind::classify("Archive"),
        Some(FilePatternKind::LiteralName("archive".to_string()))
    );
    assert_eq!(
        FilePatternKind::classify("/Root/Archive.md"),
        Some(FilePatternKind::LiteralPath("root/archive.md".to_string()))
    );
    assert_eq!(
        FilePatternKind::classify(".PDF"),
        Some(FilePatternKind::LiteralExtension("pdf".to_string()))
    );
    assert_eq!(
        FilePatternKind::classify("."),
        Some(FilePatternKind::LiteralName(".".to_string()))
    );
    assert!(matches!(
        FilePatternKind::classify("*.bak"),
        Some(FilePatternKind::NameGlob(_))
    ));
    assert!(matches!(
        FilePatternKind::classify("/templates/*"),
        Some(FilePatternKind::PathGlob(_))
    ));
    assert_eq!(FilePatternKind::classify("  "), None);
    assert_eq!(FilePatternKind::classify("/"), None);
}

#[test]
fn test_literal_extension() {
    let matcher = HiddenFileNameMatcher::new([".pdf"]);
    assert!(matcher.matches("papers/Report.PDF"));
    assert!(matcher.matches("a.pdf"));
    assert!(!matcher.matches("notes/pdf.md"));
    assert!(!matcher.matches("pdf"));
}

#[test]
fn test_literal_name_and_path() {
    let matcher = HiddenFileNameMatcher::new(["Secret", "/Journal/2020.md"]);
    assert!(matcher.matches("any/where/secret.md"));
    assert!(matcher.matches("secret"));
    assert!(!matcher.matches("secrets.md"));
    assert!(matcher.matches("journal/2020.md"));
    assert!(matcher.matches("/Journal/2020.md"));
    assert!(!matcher.matches("other/journal/2020.md"));
}

#[test]
fn test_globs() {
    let matcher = HiddenFileNameMatcher::new(["draft-*", "*.bak", "templates/*"]);
    assert!(matcher.matches("x/draft-one.md"));
    assert!(matcher.matches("notes.md.bak"));
    assert!(!matcher.matches("x/final-draft.md"));
    assert!(matcher.matches("templates/daily.md"));
    assert!(matcher.matches("templates/sub/daily.md"));
    assert!(!matcher.matches("x/templates/daily.md"));

    let matcher = HiddenFileNameMatcher::new(["b*"]);
    // extension-only pass: `*` globs are tried against the bare extension last
    assert!(matcher.matches("x/archive.bak"));
}

#[test]
fn test_empty() {
    let matcher = HiddenFileNameMatcher::new(Vec::<String>::new());
    assert!(matcher.is_empty());
    assert!(!matcher.matches("anything.md"));

    let matcher = HiddenFileNameMatcher::new(["*"]);
    assert!(matcher.matches("anything.md"));
}

#[test]
fn test_name_glob_reaches_extension() {
    let matcher = HiddenFileNameMatcher::new(["b*"]);
    assert!(matcher.matches("notes/budget.md"));
    assert!(matcher.matches("notes/report.base"));
    assert!(!matcher.matches("notes/report.md"));

    let matcher = HiddenFileNameMatcher::new(["b*.md"]);
    assert!(matcher.matches("notes/budget.md"));
    assert!(!matcher.matches("notes/report.base"));
}
