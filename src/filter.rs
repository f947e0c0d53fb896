//! Deciding whether a file, folder or tag is listed.
//!
//! A [`FilterState`] snapshots the active profile's compiled matchers. Files are checked against
//! every configured rule, and any single rule hiding the file is enough. Frontmatter and tags
//! come from the host's metadata cache through [`MetadataSource`] and are only looked up when a
//! rule actually needs them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::MatcherCache;
use crate::file_name_matcher::HiddenFileNameMatcher;
use crate::folder_matcher::HiddenFolderMatcher;
use crate::frontmatter::{Frontmatter, FrontmatterPropertyMatcher};
use crate::profile::{FileVisibility, get_active_vault_profile};
use crate::settings::NavigatorSettings;
use crate::tag_matcher::HiddenTagMatcher;
use crate::vault_path::VaultPath;

/// Whether files inside hidden folders are dropped by [`passes_exclusion_filters`].
///
/// Off: folder rules only hide folders in the navigation tree, while the files inside them stay
/// part of file listings and indexes.
pub const SKIP_EXCLUDED_FOLDERS_IN_INDEX: bool = false;

/// Access to the host's cached note metadata.
pub trait MetadataSource {
    /// Parsed frontmatter of a note, if any.
    fn frontmatter(&self, path: &str) -> Option<&Frontmatter>;

    /// Tags of a note, with or without leading `#`.
    fn tags(&self, path: &str) -> Vec<String>;
}

/// A [`MetadataSource`] backed by plain maps.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMetadata {
    frontmatter: HashMap<String, Frontmatter>,
    tags: HashMap<String, Vec<String>>,
}

impl InMemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frontmatter(&mut self, path: impl Into<String>, frontmatter: Frontmatter) {
        self.frontmatter.insert(path.into(), frontmatter);
    }

    pub fn set_tags<I, S>(&mut self, path: impl Into<String>, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .insert(path.into(), tags.into_iter().map(Into::into).collect());
    }

    pub fn remove(&mut self, path: &str) {
        self.frontmatter.remove(path);
        self.tags.remove(path);
    }
}

impl MetadataSource for InMemoryMetadata {
    fn frontmatter(&self, path: &str) -> Option<&Frontmatter> {
        self.frontmatter.get(path)
    }

    fn tags(&self, path: &str) -> Vec<String> {
        self.tags.get(path).cloned().unwrap_or_default()
    }
}

/// The rules to apply in one filter pass.
#[derive(Clone, Debug)]
pub struct FilterState {
    show_hidden_items: bool,
    file_visibility: FileVisibility,
    check_excluded_folders: bool,
    file_names: Option<Arc<HiddenFileNameMatcher>>,
    frontmatter: Option<Arc<FrontmatterPropertyMatcher>>,
    tags: Option<Arc<HiddenTagMatcher>>,
    folders: Option<Arc<HiddenFolderMatcher>>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            show_hidden_items: false,
            file_visibility: FileVisibility::default(),
            check_excluded_folders: SKIP_EXCLUDED_FOLDERS_IN_INDEX,
            file_names: None,
            frontmatter: None,
            tags: None,
            folders: None,
        }
    }
}

impl FilterState {
    /// A state without any rules, listing documents only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the state for the active profile, compiling matchers through `cache`.
    pub fn from_settings(settings: &NavigatorSettings, cache: &MatcherCache) -> Self {
        let mut this = Self::new().show_hidden_items(settings.show_hidden_items);

        let profile = match get_active_vault_profile(settings) {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("filtering without hidden-item rules: {err}");
                return this;
            }
        };

        this.file_visibility = profile.file_visibility;
        if has_patterns(&profile.hidden_file_name_patterns) {
            this.file_names = Some(cache.file_name_matcher(&profile.hidden_file_name_patterns));
        }
        if has_patterns(&profile.hidden_files) {
            this.frontmatter = Some(cache.frontmatter_matcher(&profile.hidden_files));
        }
        if has_patterns(&profile.hidden_tags) {
            this.tags = Some(cache.tag_matcher(&profile.hidden_tags));
        }
        if has_patterns(&profile.hidden_folders) {
            this.folders = Some(cache.folder_matcher(&profile.hidden_folders));
        }
        this
    }

    /// Builder method to set the "show hidden items" override.
    pub fn show_hidden_items(mut self, show: bool) -> Self {
        self.show_hidden_items = show;
        self
    }

    /// Builder method to set the file visibility mode.
    pub fn file_visibility(mut self, visibility: FileVisibility) -> Self {
        self.file_visibility = visibility;
        self
    }

    /// Builder method to make [`passes_exclusion_filters`] drop files inside hidden folders.
    pub fn check_excluded_folders(mut self, check: bool) -> Self {
        self.check_excluded_folders = check;
        self
    }

    pub fn file_name_matcher(mut self, matcher: Arc<HiddenFileNameMatcher>) -> Self {
        self.file_names = Some(matcher);
        self
    }

    pub fn frontmatter_matcher(mut self, matcher: Arc<FrontmatterPropertyMatcher>) -> Self {
        self.frontmatter = Some(matcher);
        self
    }

    pub fn tag_matcher(mut self, matcher: Arc<HiddenTagMatcher>) -> Self {
        self.tags = Some(matcher);
        self
    }

    pub fn folder_matcher(mut self, matcher: Arc<HiddenFolderMatcher>) -> Self {
        self.folders = Some(matcher);
        self
    }

    pub fn is_showing_hidden_items(&self) -> bool {
        self.show_hidden_items
    }

    /// Check visibility mode and hidden-item rules for a file.
    pub fn passes_file_filters(&self, path: &str, source: &dyn MetadataSource) -> bool {
        self.file_visibility.allows(path) && passes_exclusion_filters(path, self, source)
    }

    /// Whether a folder should be left out of the navigation tree: it or one of its ancestors is
    /// hidden.
    pub fn is_folder_hidden(&self, folder_path: &str) -> bool {
        !self.show_hidden_items
            && self
                .folders
                .as_ref()
                .is_some_and(|folders| folders.folder_in_excluded_folder(folder_path))
    }

    /// Whether a tag (and with it its subtree) should be left out of the tag tree.
    pub fn is_tag_hidden(&self, tag: &str) -> bool {
        !self.show_hidden_items && self.tags.as_ref().is_some_and(|tags| tags.matches(tag))
    }
}

fn has_patterns(patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| !pattern.trim().is_empty())
}

/// Check whether a file survives the hidden-item rules of `state`.
///
/// With "show hidden items" on every file passes. Otherwise the file is hidden as soon as one
/// rule matches, checked cheapest first: frontmatter properties (markdown notes only), file
/// name patterns, tags, and, if enabled on the state, hidden ancestor folders.
pub fn passes_exclusion_filters(
    path: &str,
    state: &FilterState,
    source: &dyn MetadataSource,
) -> bool {
    if state.show_hidden_items {
        return true;
    }

    let file = VaultPath::new(path);

    if let Some(matcher) = state.frontmatter.as_deref()
        && matcher.has_criteria()
        && file.is_markdown()
        && let Some(frontmatter) = source.frontmatter(path)
        && matcher.matches(frontmatter)
    {
        return false;
    }

    if let Some(matcher) = state.file_names.as_deref()
        && matcher.matches(path)
    {
        return false;
    }

    if let Some(matcher) = state.tags.as_deref()
        && !matcher.is_empty()
        && matcher.any_hidden(source.tags(path))
    {
        return false;
    }

    if state.check_excluded_folders
        && let Some(matcher) = state.folders.as_deref()
        && matcher.path_in_excluded_folder(path)
    {
        return false;
    }

    true
}

/// Keep the files passing visibility mode and hidden-item rules.
pub fn filter_files<I, S>(paths: I, state: &FilterState, source: &dyn MetadataSource) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .filter(|path| state.passes_file_filters(path.as_ref(), source))
        .collect()
}

/// Keep the folders which are neither hidden nor inside a hidden folder.
pub fn filter_folders<I, S>(paths: I, state: &FilterState) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .filter(|path| !state.is_folder_hidden(path.as_ref()))
        .collect()
}

/// Keep the tags which are not hidden.
pub fn filter_tags<I, S>(tags: I, state: &FilterState) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter(|tag| !state.is_tag_hidden(tag.as_ref()))
        .collect()
}

#[cfg(test)]
fn frontmatter(value: serde_json::Value) -> Frontmatter {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("frontmatter fixture must be an object"),
    }
}

#[cfg(test)]
struct CountingSource {
    inner: InMemoryMetadata,
    lookups: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MetadataSource for CountingSource {
    fn frontmatter(&self, path: &str) -> Option<&Frontmatter> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.frontmatter(path)
    }

    fn tags(&self, path: &str) -> Vec<String> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.tags(path)
    }
}

#[test]
fn test_any_rule_hides() {
    let cache = MatcherCache::new();
    let state = FilterState::new()
        .frontmatter_matcher(cache.frontmatter_matcher(&["private"]))
        .file_name_matcher(cache.file_name_matcher(&["*.bak"]));

    let mut source = InMemoryMetadata::new();
    source.set_frontmatter(
        "notes/diary.md",
        frontmatter(serde_json::json!({ "private": true })),
    );
    source.set_frontmatter(
        "notes/public.md",
        frontmatter(serde_json::json!({ "private": false, "x": 1 })),
    );
    source.set_frontmatter(
        "notes/other.md",
        frontmatter(serde_json::json!({ "status": "done" })),
    );

    // hidden by frontmatter alone, the name matches no pattern
    assert!(!passes_exclusion_filters("notes/diary.md", &state, &source));
    // bare key rules hide regardless of value
    assert!(!passes_exclusion_filters("notes/public.md", &state, &source));
    assert!(passes_exclusion_filters("notes/other.md", &state, &source));
    assert!(!passes_exclusion_filters("notes/other.md.bak", &state, &source));
}

#[test]
fn test_frontmatter_only_for_markdown() {
    let cache = MatcherCache::new();
    let state = FilterState::new().frontmatter_matcher(cache.frontmatter_matcher(&["private"]));
    let mut source = InMemoryMetadata::new();
    source.set_frontmatter("board.canvas", frontmatter(serde_json::json!({ "private": 1 })));
    assert!(passes_exclusion_filters("board.canvas", &state, &source));
}

#[test]
fn test_show_hidden_override() {
    let cache = MatcherCache::new();
    let state = FilterState::new()
        .file_name_matcher(cache.file_name_matcher(&["*"]))
        .tag_matcher(cache.tag_matcher(&["*"]))
        .folder_matcher(cache.folder_matcher(&["*"]))
        .check_excluded_folders(true)
        .show_hidden_items(true);
    let source = InMemoryMetadata::new();

    assert!(passes_exclusion_filters("a/b.md", &state, &source));
    assert!(!state.is_folder_hidden("a"));
    assert!(!state.is_tag_hidden("x"));
    assert_eq!(
        filter_files(["a/b.md", "c.md"], &state, &source),
        vec!["a/b.md", "c.md"]
    );
}

#[test]
fn test_tags_hide() {
    let cache = MatcherCache::new();
    let state = FilterState::new().tag_matcher(cache.tag_matcher(&["private"]));
    let mut source = InMemoryMetadata::new();
    source.set_tags("a.md", ["#work", "#private/health"]);
    source.set_tags("b.md", ["#work"]);

    assert!(!passes_exclusion_filters("a.md", &state, &source));
    assert!(passes_exclusion_filters("b.md", &state, &source));
    assert!(passes_exclusion_filters("c.md", &state, &source));
    assert_eq!(filter_tags(vec!["work", "private", "private/x"], &state), vec!["work"]);
}

#[test]
fn test_folder_check_is_opt_in() {
    let cache = MatcherCache::new();
    let state = FilterState::new().folder_matcher(cache.folder_matcher(&["archive"]));
    let source = InMemoryMetadata::new();

    assert!(passes_exclusion_filters("archive/old.md", &state, &source));
    assert!(state.is_folder_hidden("archive"));
    assert!(state.is_folder_hidden("archive/2020"));
    assert_eq!(
        filter_folders(["archive", "archive/2020", "notes"], &state),
        vec!["notes"]
    );

    let state = state.check_excluded_folders(true);
    assert!(!passes_exclusion_filters("archive/old.md", &state, &source));
    assert!(passes_exclusion_filters("notes/new.md", &state, &source));
}

#[test]
fn test_metadata_is_looked_up_lazily() {
    let source = CountingSource {
        inner: InMemoryMetadata::new(),
        lookups: std::cell::Cell::new(0),
    };
    let cache = MatcherCache::new();

    let state = FilterState::new().file_name_matcher(cache.file_name_matcher(&["x"]));
    assert!(passes_exclusion_filters("a.md", &state, &source));
    assert_eq!(source.lookups.get(), 0);

    let state = state.frontmatter_matcher(cache.frontmatter_matcher(&["private"]));
    assert!(passes_exclusion_filters("a.md", &state, &source));
    assert!(passes_exclusion_filters("a.png", &state, &source));
    assert_eq!(source.lookups.get(), 1);
}

#[test]
fn test_visibility_and_filter_files() {
    let cache = MatcherCache::new();
    let source = InMemoryMetadata::new();
    let state = FilterState::new().file_name_matcher(cache.file_name_matcher(&["draft*"]));
    assert_eq!(
        filter_files(
            vec!["a.md".to_string(), "b.pdf".to_string(), "draft-c.md".to_string()],
            &state,
            &source,
        ),
        vec!["a.md".to_string()]
    );

    let state = state.file_visibility(FileVisibility::Supported);
    assert_eq!(
        filter_files(["a.md", "b.pdf", "c.zip"], &state, &source),
        vec!["a.md", "b.pdf"]
    );
}

#[test]
fn test_from_settings() {
    let mut settings = NavigatorSettings::default();
    crate::ensure_vault_profiles(&mut settings);
    {
        let profile = &mut settings.vault_profiles[0];
        profile.hidden_folders = vec!["archive".to_string()];
        profile.hidden_tags = vec!["private".to_string()];
        profile.hidden_file_name_patterns = vec![" ".to_string()];
        profile.file_visibility = FileVisibility::All;
    }

    let cache = MatcherCache::new();
    let state = FilterState::from_settings(&settings, &cache);
    assert!(state.file_names.is_none());
    assert!(state.frontmatter.is_none());
    assert!(state.is_folder_hidden("archive"));
    assert!(state.is_tag_hidden("private"));
    assert!(state.passes_file_filters("tool.exe", &InMemoryMetadata::new()));

    // the same settings reuse the compiled matchers
    let again = FilterState::from_settings(&settings, &cache);
    assert!(Arc::ptr_eq(
        state.folders.as_ref().unwrap(),
        again.folders.as_ref().unwrap()
    ));

    settings.show_hidden_items = true;
    let state = FilterState::from_settings(&settings, &cache);
    assert!(!state.is_folder_hidden("archive"));
}
