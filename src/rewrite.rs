//! Keeping stored patterns valid when folders, files or tags are renamed or deleted.
//!
//! Without this, renaming `projects` to `work` would silently orphan a rule like
//! `/projects/*`. Only the literal prefix of a pattern is ever rewritten: a pattern is touched
//! when its leading literal segments start with the renamed path, and everything after the
//! renamed part (literal or wildcard) is kept as is.
//!
//! Every function returns whether settings changed, so the caller knows to persist them.

use std::collections::HashSet;

use crate::folder_matcher::HiddenFolderMatcher;
use crate::pattern::{PathPattern, PatternFlag, split_segments};
use crate::profile::Shortcut;
use crate::settings::NavigatorSettings;
use crate::vault_path::normalize_tag;

/// Rewrite hidden folder path patterns of all profiles after a folder rename.
///
/// `/projects/*` becomes `/work/*` when `projects` is renamed to `work`; `/projects-archive` or
/// folder *name* patterns like `projects` are left alone.
pub fn update_hidden_folder_exact_matches(
    settings: &mut NavigatorSettings,
    previous_path: &str,
    next_path: &str,
) -> bool {
    let previous = split_segments(previous_path);
    let next = split_segments(next_path);
    if previous.is_empty() || next.is_empty() || previous == next {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        if let Some(updated) =
            rewrite_patterns(&profile.hidden_folders, PatternFlag::REQUIRE_ROOT, |pattern| {
                pattern.replace_literal_prefix(&previous, &next)
            })
        {
            log::info!(
                "profile '{}': hidden folders updated for rename {previous_path:?} -> {next_path:?}",
                profile.id,
            );
            profile.hidden_folders = updated;
            changed = true;
        }
    }
    changed
}

/// Drop hidden folder path patterns of all profiles naming exactly a deleted folder.
///
/// Only purely literal patterns equal to the deleted path go away. Patterns with anything after
/// it, like `/projects/drafts` or `/projects/*` when `projects` was deleted, are kept.
pub fn remove_hidden_folder_exact_matches(
    settings: &mut NavigatorSettings,
    target_path: &str,
) -> bool {
    let target = split_segments(target_path);
    if target.is_empty() {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        let before = profile.hidden_folders.len();
        profile.hidden_folders.retain(|pattern| {
            PathPattern::parse(pattern, PatternFlag::REQUIRE_ROOT)
                .map(|parsed| !parsed.literal_equals(&target))
                .unwrap_or(true)
        });
        if profile.hidden_folders.len() != before {
            log::info!(
                "profile '{}': removed hidden folder pattern for deleted {target_path:?}",
                profile.id,
            );
            changed = true;
        }
    }
    changed
}

/// Rewrite hidden tag patterns of all profiles after a tag rename. Subtag patterns follow the
/// renamed tag (`archive/old` becomes `past/old` when `archive` is renamed to `past`).
pub fn update_hidden_tag_prefix_matches(
    settings: &mut NavigatorSettings,
    previous_tag: &str,
    next_tag: &str,
) -> bool {
    let previous_tag = previous_tag.trim().trim_start_matches('#');
    let next_tag = next_tag.trim().trim_start_matches('#');
    let previous = split_segments(previous_tag);
    let next = split_segments(next_tag);
    if previous.is_empty() || next.is_empty() || previous == next {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        if let Some(updated) =
            rewrite_patterns(&profile.hidden_tags, PatternFlag::TAG_PATH, |pattern| {
                pattern.replace_literal_prefix(&previous, &next)
            })
        {
            log::info!(
                "profile '{}': hidden tags updated for rename #{previous_tag} -> #{next_tag}",
                profile.id,
            );
            profile.hidden_tags = updated;
            changed = true;
        }
    }
    changed
}

/// Drop literal hidden tag patterns of all profiles for a deleted tag and its subtags.
pub fn remove_hidden_tag_prefix_matches(settings: &mut NavigatorSettings, target_tag: &str) -> bool {
    let target_tag = normalize_tag(target_tag);
    let target = split_segments(&target_tag);
    if target.is_empty() {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        let before = profile.hidden_tags.len();
        profile.hidden_tags.retain(|pattern| {
            PathPattern::parse(pattern, PatternFlag::TAG_PATH)
                .map(|parsed| !(parsed.is_literal() && parsed.literal_prefix_starts_with(&target)))
                .unwrap_or(true)
        });
        if profile.hidden_tags.len() != before {
            log::info!(
                "profile '{}': removed hidden tag pattern(s) for deleted #{target_tag}",
                profile.id,
            );
            changed = true;
        }
    }
    changed
}

/// Add a pattern to a hidden folder list, dropping what it makes redundant.
///
/// If the new pattern is a rooted literal path, existing rooted patterns at or below it are
/// removed, and the pattern is not added at all if an existing rule already hides that folder.
/// The result never contains case-insensitive duplicates or blank entries.
pub fn cleanup_exclusion_patterns(existing: &[String], new_pattern: &str) -> Vec<String> {
    let new_pattern = new_pattern.trim();
    if new_pattern.is_empty() {
        return dedup_patterns(existing.iter().map(String::as_str));
    }

    let parsed = PathPattern::parse(new_pattern, PatternFlag::REQUIRE_ROOT)
        .ok()
        .filter(PathPattern::is_literal);
    let Some(parsed) = parsed else {
        return dedup_patterns(
            existing
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(new_pattern)),
        );
    };

    let new_path = parsed.raw().to_string();
    if HiddenFolderMatcher::new(existing).folder_in_excluded_folder(&new_path) {
        log::debug!("{new_pattern:?} is already covered by existing patterns");
        return dedup_patterns(existing.iter().map(String::as_str));
    }

    let new_segments = split_segments(&new_path);
    let kept = existing.iter().map(String::as_str).filter(|pattern| {
        PathPattern::parse(pattern, PatternFlag::REQUIRE_ROOT)
            .map(|existing| !existing.literal_prefix_starts_with(&new_segments))
            .unwrap_or(true)
    });
    dedup_patterns(kept.chain(std::iter::once(new_pattern)))
}

/// Rebase navigation banner and shortcut paths of all profiles after a file or folder rename.
pub fn update_navigation_paths(
    settings: &mut NavigatorSettings,
    previous_path: &str,
    next_path: &str,
) -> bool {
    let previous = previous_path.trim_matches('/');
    let next = next_path.trim_matches('/');
    if previous.is_empty() || next.is_empty() || previous == next {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        if let Some(banner) = profile.navigation_banner.as_mut()
            && let Some(rebased) = rebase_path(banner, previous, next)
        {
            *banner = rebased;
            changed = true;
        }

        for shortcut in &mut profile.shortcuts {
            if let Shortcut::Folder { path } | Shortcut::Note { path } = shortcut
                && let Some(rebased) = rebase_path(path, previous, next)
            {
                *path = rebased;
                changed = true;
            }
        }
    }

    if changed {
        log::info!("navigation paths updated for rename {previous_path:?} -> {next_path:?}");
    }
    changed
}

/// Drop navigation banner and shortcuts of all profiles pointing at or below a deleted path.
pub fn remove_navigation_paths(settings: &mut NavigatorSettings, target_path: &str) -> bool {
    let target = target_path.trim_matches('/');
    if target.is_empty() {
        return false;
    }

    let mut changed = false;
    for profile in &mut settings.vault_profiles {
        if profile
            .navigation_banner
            .as_deref()
            .is_some_and(|banner| is_at_or_below(banner, target))
        {
            profile.navigation_banner = None;
            changed = true;
        }

        let before = profile.shortcuts.len();
        profile.shortcuts.retain(|shortcut| match shortcut {
            Shortcut::Folder { path } | Shortcut::Note { path } => !is_at_or_below(path, target),
            Shortcut::Search { .. } | Shortcut::Tag { .. } => true,
        });
        changed |= profile.shortcuts.len() != before;
    }
    changed
}

fn is_at_or_below(path: &str, target: &str) -> bool {
    let path = path.trim_matches('/');
    path == target
        || path
            .strip_prefix(target)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn rebase_path(path: &str, previous: &str, next: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    if trimmed == previous {
        return Some(next.to_string());
    }
    let rest = trimmed.strip_prefix(previous)?.strip_prefix('/')?;
    Some(format!("{next}/{rest}"))
}

/// Apply `rewrite` to every parsable pattern. Returns the new list if anything changed.
fn rewrite_patterns<F>(patterns: &[String], flags: PatternFlag, mut rewrite: F) -> Option<Vec<String>>
where
    F: FnMut(&PathPattern) -> Option<String>,
{
    let mut changed = false;
    let rewritten: Vec<String> = patterns
        .iter()
        .map(|pattern| {
            let updated = PathPattern::parse(pattern, flags)
                .ok()
                .and_then(|parsed| rewrite(&parsed));
            match updated {
                Some(updated) if updated != *pattern => {
                    changed = true;
                    updated
                }
                _ => pattern.clone(),
            }
        })
        .collect();

    if changed {
        Some(dedup_patterns(rewritten.iter().map(String::as_str)))
    } else {
        None
    }
}

/// Remove blank entries and case-insensitive duplicates, keeping the first occurrence.
fn dedup_patterns<'a, I>(patterns: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    patterns
        .into_iter()
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty() && seen.insert(pattern.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
fn settings_with_folders(folders: &[&str]) -> NavigatorSettings {
    let mut settings = NavigatorSettings::default();
    crate::ensure_vault_profiles(&mut settings);
    settings.vault_profiles[0].hidden_folders = folders.iter().map(|s| s.to_string()).collect();
    settings
}

#[test]
fn test_folder_rename() {
    let mut settings = settings_with_folders(&[
        "/projects/*",
        "/projects-archive",
        "projects",
        "/Projects/Drafts",
    ]);
    let mut other = crate::VaultProfile::new("Other");
    other.hidden_folders.push("/projects".to_string());
    settings.vault_profiles.push(other);

    assert!(update_hidden_folder_exact_matches(&mut settings, "projects", "work"));
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/work/*", "/projects-archive", "projects", "/work/Drafts"]
    );
    assert_eq!(settings.vault_profiles[1].hidden_folders, vec!["/work"]);

    assert!(!update_hidden_folder_exact_matches(&mut settings, "projects", "work"));
    assert!(!update_hidden_folder_exact_matches(&mut settings, "", "work"));
}

#[test]
fn test_folder_rename_deeper_than_prefix() {
    let mut settings = settings_with_folders(&["/projects/*", "/projects/drafts/*"]);
    assert!(update_hidden_folder_exact_matches(
        &mut settings,
        "projects/drafts",
        "projects/final"
    ));
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/projects/*", "/projects/final/*"]
    );
}

#[test]
fn test_folder_rename_merges_duplicates() {
    let mut settings = settings_with_folders(&["/old", "/new"]);
    assert!(update_hidden_folder_exact_matches(&mut settings, "old", "new"));
    assert_eq!(settings.vault_profiles[0].hidden_folders, vec!["/new"]);
}

#[test]
fn test_folder_delete() {
    let mut settings =
        settings_with_folders(&["/projects", "/projects/drafts", "/projects/*", "projects"]);
    assert!(remove_hidden_folder_exact_matches(&mut settings, "projects"));
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/projects/drafts", "/projects/*", "projects"]
    );
    assert!(!remove_hidden_folder_exact_matches(&mut settings, "projects"));

    assert!(remove_hidden_folder_exact_matches(&mut settings, "/Projects/Drafts/"));
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/projects/*", "projects"]
    );
}

#[test]
fn test_tag_rename_and_delete() {
    let mut settings = NavigatorSettings::default();
    crate::ensure_vault_profiles(&mut settings);
    settings.vault_profiles[0].hidden_tags = vec![
        "#archive".to_string(),
        "archive/old".to_string(),
        "archive/*".to_string(),
        "archived".to_string(),
        "temp*".to_string(),
    ];

    assert!(update_hidden_tag_prefix_matches(&mut settings, "#archive", "#past"));
    assert_eq!(
        settings.vault_profiles[0].hidden_tags,
        vec!["past", "past/old", "past/*", "archived", "temp*"]
    );

    assert!(remove_hidden_tag_prefix_matches(&mut settings, "#past"));
    assert_eq!(
        settings.vault_profiles[0].hidden_tags,
        vec!["past/*", "archived", "temp*"]
    );
    assert!(!remove_hidden_tag_prefix_matches(&mut settings, "nothing"));
}

#[test]
fn test_cleanup_exclusion_patterns() {
    let existing: Vec<String> = ["/a/b", "/a/*", "/ab", "notes", "NOTES"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    assert_eq!(
        cleanup_exclusion_patterns(&existing, "/a"),
        vec!["/ab", "notes", "/a"]
    );

    // already hidden through the `notes` name pattern
    assert_eq!(
        cleanup_exclusion_patterns(&existing, "/x/notes"),
        vec!["/a/b", "/a/*", "/ab", "notes"]
    );

    // already hidden below `/a/*`
    assert_eq!(
        cleanup_exclusion_patterns(&existing, "/a/c/d"),
        vec!["/a/b", "/a/*", "/ab", "notes"]
    );

    assert_eq!(
        cleanup_exclusion_patterns(&existing, "temp*"),
        vec!["/a/b", "/a/*", "/ab", "notes", "temp*"]
    );
    assert_eq!(
        cleanup_exclusion_patterns(&existing, "  "),
        vec!["/a/b", "/a/*", "/ab", "notes"]
    );
}

#[test]
fn test_navigation_paths() {
    let mut settings = NavigatorSettings::default();
    crate::ensure_vault_profiles(&mut settings);
    {
        let profile = &mut settings.vault_profiles[0];
        profile.navigation_banner = Some("projects/banner.md".to_string());
        profile.shortcuts = vec![
            Shortcut::Folder {
                path: "projects".to_string(),
            },
            Shortcut::Note {
                path: "projects-old/x.md".to_string(),
            },
            Shortcut::Tag {
                tag_path: "projects".to_string(),
            },
        ];
    }

    assert!(update_navigation_paths(&mut settings, "projects", "work"));
    let profile = &settings.vault_profiles[0];
    assert_eq!(profile.navigation_banner.as_deref(), Some("work/banner.md"));
    assert_eq!(
        profile.shortcuts[0],
        Shortcut::Folder {
            path: "work".to_string()
        }
    );
    assert_eq!(
        profile.shortcuts[1],
        Shortcut::Note {
            path: "projects-old/x.md".to_string()
        }
    );

    assert!(remove_navigation_paths(&mut settings, "work"));
    let profile = &settings.vault_profiles[0];
    assert_eq!(profile.navigation_banner, None);
    assert_eq!(profile.shortcuts.len(), 2);
    assert!(!remove_navigation_paths(&mut settings, "work"));
}
