//! Content-keyed caches for compiled matchers.
//!
//! Filtering runs for every listing the navigator renders, while the configured pattern sets
//! rarely change. A [`MatcherCache`] keeps one compiled matcher per distinct pattern set, keyed
//! by the trimmed, case-folded, sorted and deduplicated patterns. Looking up the same set again
//! (in any order, with any casing or surrounding whitespace) returns the very same [`Arc`], so
//! callers can memoize on [`Arc::ptr_eq`].
//!
//! The cache owns no external resources, clearing it at any time only costs a recompile.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::file_name_matcher::HiddenFileNameMatcher;
use crate::folder_matcher::HiddenFolderMatcher;
use crate::frontmatter::FrontmatterPropertyMatcher;
use crate::tag_matcher::HiddenTagMatcher;

/// Default number of frontmatter matchers kept around. Every vault profile contributes at most
/// one rule set, so this only overflows with a lot of profiles or rapid edits.
pub const FRONTMATTER_CACHE_CAPACITY: usize = 32;

/// Separator for cache keys. Patterns containing it never parse, so keys cannot collide.
const KEY_SEPARATOR: char = '\0';

/// Build the cache key of a pattern set.
pub fn pattern_set_key<I, S>(patterns: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = patterns
        .into_iter()
        .map(|pattern| pattern.as_ref().trim().to_lowercase())
        .filter(|pattern| !pattern.is_empty())
        .collect();
    normalized.sort_unstable();
    normalized.dedup();

    let mut key = String::new();
    for (index, pattern) in normalized.iter().enumerate() {
        if index > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(pattern);
    }
    key
}

/// Holds the compiled matchers of one navigator instance.
pub struct MatcherCache {
    file_names: Mutex<HashMap<String, Arc<HiddenFileNameMatcher>>>,
    folders: Mutex<HashMap<String, Arc<HiddenFolderMatcher>>>,
    tags: Mutex<HashMap<String, Arc<HiddenTagMatcher>>>,
    frontmatter: Mutex<LruCache<String, Arc<FrontmatterPropertyMatcher>>>,
}

impl Default for MatcherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatcherCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherCache")
            .field("file_names", &self.file_names.lock().len())
            .field("folders", &self.folders.lock().len())
            .field("tags", &self.tags.lock().len())
            .field("frontmatter", &self.frontmatter.lock().len())
            .finish()
    }
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::with_frontmatter_capacity(FRONTMATTER_CACHE_CAPACITY)
    }

    /// Create a cache keeping at most `capacity` frontmatter matchers (at least one).
    pub fn with_frontmatter_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            file_names: Mutex::new(HashMap::new()),
            folders: Mutex::new(HashMap::new()),
            tags: Mutex::new(HashMap::new()),
            frontmatter: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get or compile the matcher for a set of hidden file name patterns.
    pub fn file_name_matcher<S: AsRef<str>>(&self, patterns: &[S]) -> Arc<HiddenFileNameMatcher> {
        cached(&self.file_names, "file name", patterns, |patterns| {
            HiddenFileNameMatcher::new(patterns)
        })
    }

    /// Get or compile the matcher for a set of hidden folder patterns.
    pub fn folder_matcher<S: AsRef<str>>(&self, patterns: &[S]) -> Arc<HiddenFolderMatcher> {
        cached(&self.folders, "folder", patterns, |patterns| {
            HiddenFolderMatcher::new(patterns)
        })
    }

    /// Get or compile the matcher for a set of hidden tag patterns.
    pub fn tag_matcher<S: AsRef<str>>(&self, patterns: &[S]) -> Arc<HiddenTagMatcher> {
        cached(&self.tags, "tag", patterns, |patterns| {
            HiddenTagMatcher::new(patterns)
        })
    }

    /// Get or compile the matcher for a set of frontmatter property rules.
    ///
    /// Unlike the other matchers these live in a bounded cache, the least recently used rule set
    /// is dropped first.
    pub fn frontmatter_matcher<S: AsRef<str>>(
        &self,
        rules: &[S],
    ) -> Arc<FrontmatterPropertyMatcher> {
        let key = pattern_set_key(rules);
        let mut cache = self.frontmatter.lock();
        if let Some(matcher) = cache.get(&key) {
            log::trace!("frontmatter matcher cache hit");
            return Arc::clone(matcher);
        }

        log::debug!("compiling frontmatter matcher for {} rule(s)", rules.len());
        let matcher = Arc::new(FrontmatterPropertyMatcher::new(rules));
        if let Some((evicted, _)) = cache.push(key, Arc::clone(&matcher)) {
            log::trace!("evicted frontmatter matcher {evicted:?}");
        }
        matcher
    }

    pub fn clear_file_name_matchers(&self) {
        self.file_names.lock().clear();
    }

    pub fn clear_folder_matchers(&self) {
        self.folders.lock().clear();
    }

    pub fn clear_tag_matchers(&self) {
        self.tags.lock().clear();
    }

    pub fn clear_frontmatter_matchers(&self) {
        self.frontmatter.lock().clear();
    }

    /// Drop every compiled matcher.
    pub fn clear(&self) {
        log::debug!("clearing all matcher caches");
        self.clear_file_name_matchers();
        self.clear_folder_matchers();
        self.clear_tag_matchers();
        self.clear_frontmatter_matchers();
    }

    /// Total number of cached matchers.
    pub fn len(&self) -> usize {
        self.file_names.lock().len()
            + self.folders.lock().len()
            + self.tags.lock().len()
            + self.frontmatter.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cached<M, S, F>(
    cache: &Mutex<HashMap<String, Arc<M>>>,
    kind: &str,
    patterns: &[S],
    compile: F,
) -> Arc<M>
where
    S: AsRef<str>,
    F: FnOnce(&[S]) -> M,
{
    let key = pattern_set_key(patterns);
    let mut cache = cache.lock();
    if let Some(matcher) = cache.get(&key) {
        log::trace!("{kind} matcher cache hit");
        return Arc::clone(matcher);
    }

    log::debug!("compiling {kind} matcher for {} pattern(s)", patterns.len());
    let matcher = Arc::new(compile(patterns));
    cache.insert(key, Arc::clone(&matcher));
    matcher
}

#[test]
fn test_pattern_set_key() {
    assert_eq!(
        pattern_set_key(["b", " A ", "a", ""]),
        pattern_set_key(["a", "B"])
    );
    assert_ne!(pattern_set_key(["a", "b"]), pattern_set_key(["ab"]));
    assert_eq!(pattern_set_key(Vec::<String>::new()), "");
}

#[test]
fn test_same_set_same_matcher() {
    let cache = MatcherCache::new();
    let a = cache.file_name_matcher(&["*.bak", "Secret"]);
    let b = cache.file_name_matcher(&[" secret ", "*.BAK", "secret"]);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(b.matches("notes/secret.md"));

    let c = cache.file_name_matcher(&["*.bak"]);
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_clear() {
    let cache = MatcherCache::new();
    let a = cache.folder_matcher(&["archive"]);
    let t = cache.tag_matcher(&["private"]);
    cache.clear_folder_matchers();
    let b = cache.folder_matcher(&["archive"]);
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&t, &cache.tag_matcher(&["private"])));

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_frontmatter_lru() {
    let cache = MatcherCache::with_frontmatter_capacity(2);
    let first = cache.frontmatter_matcher(&["a"]);
    let _second = cache.frontmatter_matcher(&["b"]);
    // touch `a` so `b` is the least recently used one
    assert!(Arc::ptr_eq(&first, &cache.frontmatter_matcher(&["A"])));
    let _third = cache.frontmatter_matcher(&["c"]);
    assert_eq!(cache.len(), 2);
    assert!(Arc::ptr_eq(&first, &cache.frontmatter_matcher(&["a"])));

    let capped = MatcherCache::with_frontmatter_capacity(0);
    capped.frontmatter_matcher(&["x"]);
    capped.frontmatter_matcher(&["y"]);
    assert_eq!(capped.len(), 1);
}
