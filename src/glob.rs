//! A simplified `*`-only glob used for file, folder and tag name patterns.
//!
//! The matcher is a greedy, non-backtracking left-to-right scan over the literal parts of the
//! pattern. This is *not* a POSIX-complete glob: with several wildcards the first occurrence of
//! each part wins. For the short names and paths found in a vault that is good enough and avoids
//! compiling a regex per pattern.

use std::fmt;

/// A compiled `*` glob.
#[derive(Clone, PartialEq, Eq)]
pub struct Glob {
    /// Original pattern text.
    source: String,

    /// The pattern was exactly `*`.
    match_all: bool,

    /// The non-empty literal parts between the stars.
    parts: Vec<String>,

    /// The pattern does not start with a `*`, so the first part must be a prefix.
    requires_prefix: bool,

    /// The pattern does not end with a `*`, so the last part must be a suffix.
    requires_suffix: bool,
}

impl fmt::Debug for Glob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Glob({:?})", self.source)
    }
}

impl Glob {
    /// Compile a glob pattern. Never fails; a pattern without stars behaves like an exact match.
    pub fn compile<T: AsRef<str>>(glob: T) -> Self {
        Self::compile_do(glob.as_ref())
    }

    fn compile_do(glob: &str) -> Self {
        if glob == "*" {
            return Self {
                source: glob.to_string(),
                match_all: true,
                parts: Vec::new(),
                requires_prefix: false,
                requires_suffix: false,
            };
        }

        Self {
            source: glob.to_string(),
            match_all: false,
            parts: glob
                .split('*')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            requires_prefix: !glob.starts_with('*'),
            requires_suffix: !glob.ends_with('*'),
        }
    }

    /// Get the pattern text this glob was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this glob contains a wildcard at all.
    pub fn has_wildcard(&self) -> bool {
        self.match_all || self.source.contains('*')
    }

    /// Check whether `value` matches.
    ///
    /// Case handling is up to the caller: both the pattern and the value are compared as-is.
    pub fn matches<T: AsRef<str>>(&self, value: T) -> bool {
        self.matches_do(value.as_ref())
    }

    fn matches_do(&self, value: &str) -> bool {
        if self.match_all {
            return true;
        }

        if self.parts.is_empty() {
            // `**` and friends, or an empty pattern which only matches an empty value
            return self.source.contains('*') || value.is_empty();
        }

        let last = self.parts.len() - 1;
        let mut cursor = 0;
        for (index, part) in self.parts.iter().enumerate() {
            if index == 0 && self.requires_prefix {
                if !value.starts_with(part.as_str()) {
                    return false;
                }
                cursor = part.len();
            } else if index == last && self.requires_suffix {
                // the last part must end the value without overlapping what was consumed
                return value.len() >= cursor + part.len() && value.ends_with(part.as_str());
            } else {
                match value[cursor..].find(part.as_str()) {
                    Some(offset) => cursor += offset + part.len(),
                    None => return false,
                }
            }
        }

        !self.requires_suffix || cursor == value.len()
    }
}

#[test]
fn test_prefix_and_suffix() {
    let glob = Glob::compile("assets*");
    assert!(glob.matches("assets"));
    assert!(glob.matches("assets2024"));
    assert!(!glob.matches("my-assets"));

    let glob = Glob::compile("*_temp");
    assert!(glob.matches("build_temp"));
    assert!(glob.matches("_temp"));
    assert!(!glob.matches("temp_build"));
    assert!(!glob.matches("build_temp2"));
}

#[test]
fn test_match_all() {
    let glob = Glob::compile("*");
    assert!(glob.matches(""));
    assert!(glob.matches("anything/at/all.md"));

    let glob = Glob::compile("**");
    assert!(glob.matches("x"));
}

#[test]
fn test_middle_and_multiple_parts() {
    let glob = Glob::compile("draft*.md");
    assert!(glob.matches("draft.md"));
    assert!(glob.matches("draft-2024.md"));
    assert!(!glob.matches("draft.txt"));
    assert!(!glob.matches("old-draft.md"));

    let glob = Glob::compile("*notes*");
    assert!(glob.matches("notes"));
    assert!(glob.matches("meeting notes 2024"));
    assert!(!glob.matches("note"));

    let glob = Glob::compile("a*b*c");
    assert!(glob.matches("abc"));
    assert!(glob.matches("axxbxxc"));
    assert!(glob.matches("axxbxxbxxc"));
    assert!(!glob.matches("axxbxxcxx"));
}

#[test]
fn test_suffix_must_not_overlap_prefix() {
    // "ab*ba" must not match "aba": the suffix would reuse the prefix's `a`.
    let glob = Glob::compile("ab*ba");
    assert!(!glob.matches("aba"));
    assert!(glob.matches("abba"));
    assert!(glob.matches("ab-ba"));
}

#[test]
fn test_greedy_first_match() {
    // The scan consumes the first `b` it finds and never backtracks, the suffix check then looks
    // at the end of the value independently.
    let glob = Glob::compile("*b*c");
    assert!(glob.matches("abxc"));
    assert!(glob.matches("bbc"));
    assert!(!glob.matches("acb"));
}

#[test]
fn test_without_wildcard_is_exact() {
    let glob = Glob::compile("readme.md");
    assert!(!glob.has_wildcard());
    assert!(glob.matches("readme.md"));
    assert!(!glob.matches("readme.md.bak"));
    assert!(!glob.matches("old-readme.md"));
}
