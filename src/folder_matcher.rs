//! Hidden folder matching.
//!
//! Folder patterns come in two flavours:
//!
//! * Name patterns (`archive`, `assets*`, `*_temp`, `*`) which match a folder of that name at
//!   any depth.
//! * Path patterns starting with a slash (`/projects/archive`, `/projects/*`) which are anchored
//!   at the vault root and matched segment by segment.
//!
//! Name patterns only understand a single leading or trailing wildcard. Anything else, like
//! `a*b` or `*a*`, is compared literally. Path patterns use the full segment glob.

use std::collections::HashSet;

use crate::pattern::{PathPattern, PatternFlag};
use crate::vault_path::VaultPath;

/// Compiled matcher over a set of hidden folder patterns.
#[derive(Clone, Debug, Default)]
pub struct HiddenFolderMatcher {
    match_all: bool,
    exact_names: HashSet<String>,
    name_prefixes: Vec<String>,
    name_suffixes: Vec<String>,
    path_patterns: Vec<PathPattern>,
}

impl HiddenFolderMatcher {
    /// Compile a matcher from raw user patterns. Blank or unparsable patterns are skipped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut this = Self::default();
        for pattern in patterns {
            this.add(pattern.as_ref());
        }
        this
    }

    fn add(&mut self, pattern: &str) {
        let pattern = pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return;
        }

        if pattern.starts_with('/') {
            match PathPattern::parse(&pattern, PatternFlag::IGNORE_CASE | PatternFlag::REQUIRE_ROOT)
            {
                Ok(parsed) => self.path_patterns.push(parsed),
                Err(err) => log::warn!("ignoring hidden folder pattern {pattern:?}: {err}"),
            }
            return;
        }

        if pattern == "*" {
            self.match_all = true;
            return;
        }

        let stars = pattern.matches('*').count();
        if stars == 1 && pattern.ends_with('*') {
            self.name_prefixes
                .push(pattern[..pattern.len() - 1].to_string());
        } else if stars == 1 && pattern.starts_with('*') {
            self.name_suffixes.push(pattern[1..].to_string());
        } else {
            // middle or multiple wildcards fall back to an exact comparison
            self.exact_names.insert(pattern);
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.match_all
            && self.exact_names.is_empty()
            && self.name_prefixes.is_empty()
            && self.name_suffixes.is_empty()
            && self.path_patterns.is_empty()
    }

    /// Check whether a single folder is hidden by name, or by path if a path is given.
    ///
    /// This does not look at the folder's ancestors, see
    /// [`folder_in_excluded_folder`](Self::folder_in_excluded_folder) for that.
    pub fn matches(&self, folder_name: &str, folder_path: Option<&str>) -> bool {
        if self.is_empty() {
            return false;
        }

        if self.match_all {
            return true;
        }

        let name = folder_name.trim().to_lowercase();
        if !name.is_empty()
            && (self.exact_names.contains(&name)
                || self.name_prefixes.iter().any(|p| name.starts_with(p.as_str()))
                || self.name_suffixes.iter().any(|s| name.ends_with(s.as_str())))
        {
            return true;
        }

        match folder_path {
            Some(path) if !self.path_patterns.is_empty() => {
                let segments = VaultPath::new(path).segments();
                !segments.is_empty()
                    && self
                        .path_patterns
                        .iter()
                        .any(|pattern| pattern.matches_segments(&segments))
            }
            _ => false,
        }
    }

    /// Check a folder by its vault path, deriving the name from the last segment.
    pub fn matches_path(&self, folder_path: &str) -> bool {
        let folder = VaultPath::new(folder_path);
        !folder.is_root() && self.matches(folder.name(), Some(folder.as_str()))
    }

    /// Check whether the folder itself or any folder containing it is hidden.
    pub fn folder_in_excluded_folder(&self, folder_path: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let folder = VaultPath::new(folder_path);
        self.matches_path(folder.as_str()) || self.path_in_excluded_folder(folder.as_str())
    }

    /// Check whether any folder containing `path` is hidden. The entry at `path` itself is not
    /// tested, so this works for files and folders alike.
    pub fn path_in_excluded_folder(&self, path: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        VaultPath::new(path)
            .ancestors()
            .any(|folder| self.matches(folder.name(), Some(folder.as_str())))
    }
}

#[test]
fn test_name_wildcards() {
    let matcher = HiddenFolderMatcher::new(["assets*", "*_temp", "Archive"]);
    assert!(matcher.matches("assets", None));
    assert!(matcher.matches("Assets2024", None));
    assert!(!matcher.matches("my-assets", None));
    assert!(matcher.matches("build_temp", None));
    assert!(!matcher.matches("temp_build", None));
    assert!(matcher.matches("archive", Some("deep/down/archive")));
    assert!(!matcher.matches("archives", None));
}

#[test]
fn test_match_all() {
    let matcher = HiddenFolderMatcher::new(["*"]);
    assert!(matcher.matches("anything", None));
    assert!(matcher.path_in_excluded_folder("a/note.md"));
    assert!(!matcher.path_in_excluded_folder("note.md"));
}

#[test]
fn test_middle_wildcard_is_exact() {
    let matcher = HiddenFolderMatcher::new(["a*b", "*x*"]);
    assert!(!matcher.matches("aXXb", None));
    assert!(matcher.matches("a*b", None));
    assert!(!matcher.matches("box", None));
    assert!(matcher.matches("*x*", None));
}

#[test]
fn test_path_patterns() {
    let matcher = HiddenFolderMatcher::new(["/projects/archive", "/work/*"]);
    assert!(matcher.matches("archive", Some("Projects/Archive")));
    assert!(!matcher.matches("archive", Some("other/archive")));
    assert!(!matcher.matches("archive", None));
    assert!(matcher.matches_path("work/client"));
    assert!(!matcher.matches_path("work"));
    assert!(!matcher.matches_path("work/client/notes"));
    assert!(!matcher.matches_path(""));
}

#[test]
fn test_ancestor_walk() {
    let matcher = HiddenFolderMatcher::new(["/work/*", "attachments"]);
    assert!(matcher.path_in_excluded_folder("work/client/notes/todo.md"));
    assert!(!matcher.path_in_excluded_folder("work/todo.md"));
    assert!(matcher.path_in_excluded_folder("x/attachments/img.png"));

    assert!(matcher.folder_in_excluded_folder("work/client"));
    assert!(matcher.folder_in_excluded_folder("work/client/deeper"));
    assert!(!matcher.folder_in_excluded_folder("work"));
    assert!(matcher.folder_in_excluded_folder("notes/attachments"));
    assert!(!matcher.folder_in_excluded_folder("notes"));
}

#[test]
fn test_invalid_patterns_are_skipped() {
    let matcher = HiddenFolderMatcher::new(["", "  ", "/"]);
    assert!(matcher.is_empty());
    assert!(!matcher.folder_in_excluded_folder("a/b"));
}
