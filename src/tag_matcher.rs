//! Hidden tag matching.
//!
//! Tag patterns are tag paths anchored at the tag root (`archive`, `projects/old`,
//! `projects/*`, `temp*`). Hiding a tag hides its whole subtree, so a tag is hidden when a
//! pattern matches the tag itself or any of its ancestors.

use crate::pattern::{PathPattern, PatternFlag};
use crate::vault_path::normalize_tag;

/// Compiled matcher over a set of hidden tag patterns.
#[derive(Clone, Debug, Default)]
pub struct HiddenTagMatcher {
    patterns: Vec<PathPattern>,
}

impl HiddenTagMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|pattern| {
                let pattern = pattern.as_ref();
                PathPattern::parse(pattern, PatternFlag::TAG_PATH | PatternFlag::IGNORE_CASE)
                    .map_err(|err| {
                        if !pattern.trim().is_empty() {
                            log::warn!("ignoring hidden tag pattern {pattern:?}: {err}");
                        }
                    })
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether a tag (with or without leading `#`) is hidden.
    pub fn matches<T: AsRef<str>>(&self, tag: T) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let tag = normalize_tag(tag.as_ref());
        let segments = crate::pattern::split_segments(&tag);
        (1..=segments.len()).any(|depth| {
            self.patterns
                .iter()
                .any(|pattern| pattern.matches_segments(&segments[..depth]))
        })
    }

    /// Check whether any of the given tags is hidden.
    pub fn any_hidden<I, S>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        !self.patterns.is_empty() && tags.into_iter().any(|tag| self.matches(tag))
    }
}

#[test]
fn test_prefix_hides_subtree() {
    let matcher = HiddenTagMatcher::new(["#Archive"]);
    assert!(matcher.matches("archive"));
    assert!(matcher.matches("#archive/2023"));
    assert!(matcher.matches("Archive/2023/q1"));
    assert!(!matcher.matches("archived"));
    assert!(!matcher.matches("projects/archive"));
}

#[test]
fn test_wildcards() {
    let matcher = HiddenTagMatcher::new(["projects/*", "temp*", "*draft"]);
    assert!(!matcher.matches("projects"));
    assert!(matcher.matches("projects/alpha"));
    assert!(matcher.matches("projects/alpha/notes"));
    assert!(matcher.matches("temporary"));
    assert!(matcher.matches("temp/x"));
    assert!(matcher.matches("firstdraft"));
    assert!(!matcher.matches("drafts"));
}

#[test]
fn test_any_hidden() {
    let matcher = HiddenTagMatcher::new(["private"]);
    assert!(matcher.any_hidden(["#work", "#private/health"]));
    assert!(!matcher.any_hidden(["#work"]));
    assert!(!matcher.any_hidden(Vec::<String>::new()));

    let matcher = HiddenTagMatcher::new(["", "#"]);
    assert!(matcher.is_empty());
    assert!(!matcher.matches("anything"));
}
