//! Hidden-item exclusion matching for a note vault navigator.
//!
//! This decides, for the files, folders and tags of a vault, whether the navigator should list
//! them. The rules come from user-configured patterns grouped into vault profiles: hidden folder
//! patterns, hidden file name patterns, hidden tags and frontmatter property rules. Matchers are
//! compiled once per distinct pattern set and cached in a [`MatcherCache`].
//!
//! Patterns are deliberately simple: `*` is the only wildcard and the glob engine is a greedy
//! ordered-parts scan (see [`Glob`]). Folder and tag path patterns are matched segment by
//! segment (see [`PathPattern`]).
//!
//! Here's a matching example going through settings as the host stores them:
//!
//! ```
//! # use vaultfilter::*;
//! # fn test() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
//! let mut settings = NavigatorSettings::from_json(r#"{
//!     "vaultProfiles": [{
//!         "id": "default",
//!         "name": "Default",
//!         "hiddenFolders": ["/projects/*", "assets*"],
//!         "hiddenFiles": ["status=archived"],
//!         "hiddenFileNamePatterns": [".pdf", "draft-*"],
//!         "hiddenTags": ["private"]
//!     }]
//! }"#)?;
//!
//! let cache = MatcherCache::new();
//! let mut metadata = InMemoryMetadata::new();
//! metadata.set_tags("journal/today.md", ["#private/health"]);
//!
//! let state = FilterState::from_settings(&settings, &cache);
//! assert!(state.passes_file_filters("notes/idea.md", &metadata));
//! assert!(!state.passes_file_filters("notes/draft-idea.md", &metadata));
//! assert!(!state.passes_file_filters("journal/today.md", &metadata));
//!
//! assert!(state.is_folder_hidden("projects/alpha"));
//! assert!(state.is_folder_hidden("projects/alpha/notes"));
//! assert!(!state.is_folder_hidden("projects"));
//! assert!(state.is_folder_hidden("media/assets2024"));
//! assert!(state.is_tag_hidden("#private/health"));
//!
//! // renaming a folder keeps the rules pointing at it
//! assert!(update_hidden_folder_exact_matches(&mut settings, "projects", "work"));
//! assert_eq!(get_active_hidden_folders(&settings), ["/work/*", "assets*"]);
//!
//! let state = FilterState::from_settings(&settings, &cache);
//! assert!(state.is_folder_hidden("work/alpha"));
//! assert!(!state.is_folder_hidden("projects/alpha"));
//! # Ok(())
//! # }
//! # test().unwrap()
//! ```

mod cache;
mod error;
mod file_name_matcher;
mod filter;
mod folder_matcher;
mod frontmatter;
mod glob;
mod pattern;
mod profile;
mod rewrite;
mod settings;
mod tag_matcher;
mod vault_path;

#[doc(inline)]
pub use cache::{FRONTMATTER_CACHE_CAPACITY, MatcherCache, pattern_set_key};

#[doc(inline)]
pub use error::{ConfigError, ProfileError};

#[doc(inline)]
pub use file_name_matcher::{FilePatternKind, HiddenFileNameMatcher};

#[doc(inline)]
pub use filter::{
    FilterState, InMemoryMetadata, MetadataSource, SKIP_EXCLUDED_FOLDERS_IN_INDEX, filter_files,
    filter_folders, filter_tags, passes_exclusion_filters,
};

#[doc(inline)]
pub use folder_matcher::HiddenFolderMatcher;

#[doc(inline)]
pub use frontmatter::{Frontmatter, FrontmatterPropertyMatcher, PropertyRule};

#[doc(inline)]
pub use glob::Glob;

#[doc(inline)]
pub use pattern::{ParseError, PathPattern, PatternFlag, Segment, split_segments};

#[doc(inline)]
pub use profile::{
    DEFAULT_VAULT_PROFILE_ID, DEFAULT_VAULT_PROFILE_NAME, FileVisibility, Shortcut, VaultProfile,
    create_vault_profile, delete_vault_profile, ensure_vault_profiles,
    get_active_file_visibility, get_active_hidden_file_name_patterns, get_active_hidden_files,
    get_active_hidden_folders, get_active_hidden_tags, get_active_vault_profile,
    get_active_vault_profile_mut, rename_vault_profile, set_active_vault_profile,
};

#[doc(inline)]
pub use rewrite::{
    cleanup_exclusion_patterns, remove_hidden_folder_exact_matches,
    remove_hidden_tag_prefix_matches, remove_navigation_paths, update_hidden_folder_exact_matches,
    update_hidden_tag_prefix_matches, update_navigation_paths,
};

#[doc(inline)]
pub use settings::NavigatorSettings;

#[doc(inline)]
pub use tag_matcher::HiddenTagMatcher;

#[doc(inline)]
pub use vault_path::{VaultPath, normalize_path, normalize_tag};
