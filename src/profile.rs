//! Vault profiles: named bundles of hidden-item rules.
//!
//! Exactly one profile is active at a time, referenced by id from [`NavigatorSettings`]. The
//! built-in default profile always exists once settings went through [`ensure_vault_profiles`]
//! and can be renamed but not deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProfileError;
use crate::settings::NavigatorSettings;
use crate::vault_path::VaultPath;

/// Id of the built-in profile.
pub const DEFAULT_VAULT_PROFILE_ID: &str = "default";

/// Display name used when a profile's name is blank.
pub const DEFAULT_VAULT_PROFILE_NAME: &str = "Default";

/// Extensions shown in [`FileVisibility::Documents`] mode.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "canvas", "base"];

/// Additional extensions the host can render, shown in [`FileVisibility::Supported`] mode.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", // documents
    "avif", "bmp", "gif", "jpeg", "jpg", "png", "svg", "webp", // images
    "3gp", "flac", "m4a", "mp3", "oga", "ogg", "opus", "wav", // audio
    "mkv", "mov", "mp4", "ogv", "webm", // video
];

/// Which files a profile lists at all, before any hidden-item rule applies.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileVisibility {
    /// Notes, canvases and bases.
    #[default]
    Documents,
    /// Everything the host can open itself.
    Supported,
    /// Every file.
    All,
}

impl FileVisibility {
    /// Check whether a file with this path is listed in this mode.
    pub fn allows(self, path: &str) -> bool {
        let extension = VaultPath::new(path).extension().to_lowercase();
        match self {
            FileVisibility::All => true,
            FileVisibility::Documents => DOCUMENT_EXTENSIONS.contains(&extension.as_str()),
            FileVisibility::Supported => {
                DOCUMENT_EXTENSIONS.contains(&extension.as_str())
                    || SUPPORTED_EXTENSIONS.contains(&extension.as_str())
            }
        }
    }
}

/// An entry in a profile's shortcut list.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shortcut {
    Folder {
        path: String,
    },
    Note {
        path: String,
    },
    Search {
        name: String,
        query: String,
    },
    Tag {
        #[serde(rename = "tagPath")]
        tag_path: String,
    },
}

/// A named set of hidden-item rules.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultProfile {
    /// Stable identifier, generated once.
    #[serde(default)]
    pub id: String,

    /// Display name, may be blank.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub file_visibility: FileVisibility,

    /// Folder name and path patterns.
    #[serde(default)]
    pub hidden_folders: Vec<String>,

    /// Frontmatter property rules, `key` or `key=value`.
    #[serde(default)]
    pub hidden_files: Vec<String>,

    /// File name, path and extension patterns.
    #[serde(default)]
    pub hidden_file_name_patterns: Vec<String>,

    /// Tag patterns.
    #[serde(default)]
    pub hidden_tags: Vec<String>,

    /// Path of a note rendered above the navigation tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_banner: Option<String>,

    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,
}

impl VaultProfile {
    /// Create an empty profile with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name)
    }

    /// Create the built-in default profile.
    pub fn default_profile() -> Self {
        Self::with_id(DEFAULT_VAULT_PROFILE_ID, DEFAULT_VAULT_PROFILE_NAME)
    }

    fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_visibility: FileVisibility::default(),
            hidden_folders: Vec::new(),
            hidden_files: Vec::new(),
            hidden_file_name_patterns: Vec::new(),
            hidden_tags: Vec::new(),
            navigation_banner: None,
            shortcuts: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_VAULT_PROFILE_ID
    }

    /// The name to show, falling back to the default name when blank.
    pub fn display_name(&self) -> &str {
        match self.name.trim() {
            "" => DEFAULT_VAULT_PROFILE_NAME,
            name => name,
        }
    }
}

/// Bring profile state into a usable shape.
///
/// Creates the default profile when there is none, moves legacy top-level exclusions into the
/// default (or first) profile, assigns ids to profiles without one, and repoints a dangling
/// active profile id to the first profile. Returns whether anything changed, in which case the
/// settings should be persisted.
pub fn ensure_vault_profiles(settings: &mut NavigatorSettings) -> bool {
    let mut changed = false;

    if settings.vault_profiles.is_empty() {
        log::info!("creating default vault profile");
        settings.vault_profiles.push(VaultProfile::default_profile());
        changed = true;
    }

    if !settings.excluded_folders.is_empty() || !settings.excluded_files.is_empty() {
        let index = settings
            .vault_profiles
            .iter()
            .position(VaultProfile::is_default)
            .unwrap_or(0);
        let profile = &mut settings.vault_profiles[index];
        log::info!(
            "migrating {} legacy folder and {} legacy property exclusion(s) into profile '{}'",
            settings.excluded_folders.len(),
            settings.excluded_files.len(),
            profile.id,
        );
        merge_patterns(&mut profile.hidden_folders, settings.excluded_folders.drain(..));
        merge_patterns(&mut profile.hidden_files, settings.excluded_files.drain(..));
        changed = true;
    }

    for profile in &mut settings.vault_profiles {
        if profile.id.trim().is_empty() {
            profile.id = Uuid::new_v4().to_string();
            changed = true;
        }
    }

    let active_known = settings
        .vault_profiles
        .iter()
        .any(|profile| profile.id == settings.vault_profile);
    if !active_known {
        let first = settings.vault_profiles[0].id.clone();
        if !settings.vault_profile.is_empty() {
            log::warn!(
                "active vault profile '{}' does not exist, using '{}'",
                settings.vault_profile,
                first,
            );
        }
        settings.vault_profile = first;
        changed = true;
    }

    changed
}

fn merge_patterns(target: &mut Vec<String>, patterns: impl Iterator<Item = String>) {
    for pattern in patterns {
        let trimmed = pattern.trim();
        if !trimmed.is_empty() && !target.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
            target.push(trimmed.to_string());
        }
    }
}

/// Get the active profile, falling back to the first profile if the active id is unknown.
pub fn get_active_vault_profile(
    settings: &NavigatorSettings,
) -> Result<&VaultProfile, ProfileError> {
    settings
        .vault_profiles
        .iter()
        .find(|profile| profile.id == settings.vault_profile)
        .or_else(|| settings.vault_profiles.first())
        .ok_or(ProfileError::NoProfiles)
}

/// Mutable variant of [`get_active_vault_profile`].
pub fn get_active_vault_profile_mut(
    settings: &mut NavigatorSettings,
) -> Result<&mut VaultProfile, ProfileError> {
    let index = settings
        .vault_profiles
        .iter()
        .position(|profile| profile.id == settings.vault_profile)
        .unwrap_or(0);
    settings
        .vault_profiles
        .get_mut(index)
        .ok_or(ProfileError::NoProfiles)
}

fn active_list(
    settings: &NavigatorSettings,
    list: impl FnOnce(&VaultProfile) -> &[String],
) -> &[String] {
    match get_active_vault_profile(settings) {
        Ok(profile) => list(profile),
        Err(_) => &[],
    }
}

/// Hidden folder patterns of the active profile.
pub fn get_active_hidden_folders(settings: &NavigatorSettings) -> &[String] {
    active_list(settings, |profile| profile.hidden_folders.as_slice())
}

/// Hidden frontmatter property rules of the active profile.
pub fn get_active_hidden_files(settings: &NavigatorSettings) -> &[String] {
    active_list(settings, |profile| profile.hidden_files.as_slice())
}

/// Hidden file name patterns of the active profile.
pub fn get_active_hidden_file_name_patterns(settings: &NavigatorSettings) -> &[String] {
    active_list(settings, |profile| profile.hidden_file_name_patterns.as_slice())
}

/// Hidden tag patterns of the active profile.
pub fn get_active_hidden_tags(settings: &NavigatorSettings) -> &[String] {
    active_list(settings, |profile| profile.hidden_tags.as_slice())
}

pub fn get_active_file_visibility(settings: &NavigatorSettings) -> FileVisibility {
    get_active_vault_profile(settings)
        .map(|profile| profile.file_visibility)
        .unwrap_or_default()
}

fn validate_profile_name<'a>(
    settings: &NavigatorSettings,
    name: &'a str,
    except_id: Option<&str>,
) -> Result<&'a str, ProfileError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProfileError::EmptyName);
    }

    let taken = settings.vault_profiles.iter().any(|profile| {
        Some(profile.id.as_str()) != except_id && profile.display_name().eq_ignore_ascii_case(name)
    });
    if taken {
        return Err(ProfileError::DuplicateName(name.to_string()));
    }

    Ok(name)
}

/// Create a new profile and return its id.
///
/// With `copy_from` the rules, visibility and shortcuts of that profile are copied.
pub fn create_vault_profile(
    settings: &mut NavigatorSettings,
    name: &str,
    copy_from: Option<&str>,
) -> Result<String, ProfileError> {
    let name = validate_profile_name(settings, name, None)?;

    let mut profile = match copy_from {
        Some(source_id) => {
            let source = settings
                .vault_profiles
                .iter()
                .find(|profile| profile.id == source_id)
                .ok_or_else(|| ProfileError::UnknownProfile(source_id.to_string()))?;
            VaultProfile {
                id: Uuid::new_v4().to_string(),
                name: String::new(),
                ..source.clone()
            }
        }
        None => VaultProfile::new(""),
    };
    profile.name = name.to_string();

    let id = profile.id.clone();
    log::info!("created vault profile '{}' ({id})", profile.name);
    settings.vault_profiles.push(profile);
    Ok(id)
}

pub fn rename_vault_profile(
    settings: &mut NavigatorSettings,
    id: &str,
    name: &str,
) -> Result<(), ProfileError> {
    let name = validate_profile_name(settings, name, Some(id))?.to_string();
    let profile = settings
        .vault_profiles
        .iter_mut()
        .find(|profile| profile.id == id)
        .ok_or_else(|| ProfileError::UnknownProfile(id.to_string()))?;
    profile.name = name;
    Ok(())
}

/// Delete a profile. The default profile and the last remaining profile cannot be deleted. If
/// the deleted profile was active, the first remaining profile becomes active.
pub fn delete_vault_profile(
    settings: &mut NavigatorSettings,
    id: &str,
) -> Result<VaultProfile, ProfileError> {
    if id == DEFAULT_VAULT_PROFILE_ID {
        return Err(ProfileError::CannotDeleteDefault);
    }

    let index = settings
        .vault_profiles
        .iter()
        .position(|profile| profile.id == id)
        .ok_or_else(|| ProfileError::UnknownProfile(id.to_string()))?;

    if settings.vault_profiles.len() == 1 {
        return Err(ProfileError::CannotDeleteLast);
    }

    let removed = settings.vault_profiles.remove(index);
    if settings.vault_profile == id {
        settings.vault_profile = settings.vault_profiles[0].id.clone();
    }
    log::info!("deleted vault profile '{}' ({id})", removed.name);
    Ok(removed)
}

pub fn set_active_vault_profile(
    settings: &mut NavigatorSettings,
    id: &str,
) -> Result<(), ProfileError> {
    if !settings.vault_profiles.iter().any(|profile| profile.id == id) {
        return Err(ProfileError::UnknownProfile(id.to_string()));
    }
    settings.vault_profile = id.to_string();
    Ok(())
}

#[cfg(test)]
fn settings_with(profiles: Vec<VaultProfile>, active: &str) -> NavigatorSettings {
    NavigatorSettings {
        vault_profiles: profiles,
        vault_profile: active.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_active_profile_fallback() {
    let mut work = VaultProfile::new("Work");
    work.hidden_folders.push("archive".to_string());
    let settings = settings_with(vec![work.clone(), VaultProfile::default_profile()], "missing");

    let active = get_active_vault_profile(&settings).unwrap();
    assert_eq!(active.id, work.id);
    assert_eq!(get_active_hidden_folders(&settings), ["archive".to_string()]);

    let settings = settings_with(Vec::new(), "missing");
    assert_eq!(
        get_active_vault_profile(&settings),
        Err(ProfileError::NoProfiles)
    );
    assert!(get_active_hidden_tags(&settings).is_empty());
}

#[test]
fn test_active_profile_by_id() {
    let mut work = VaultProfile::new("Work");
    work.file_visibility = FileVisibility::All;
    work.hidden_tags.push("private".to_string());
    let settings = settings_with(vec![VaultProfile::default_profile(), work.clone()], &work.id);

    assert_eq!(get_active_vault_profile(&settings).unwrap().id, work.id);
    assert_eq!(get_active_hidden_tags(&settings), ["private".to_string()]);
    assert_eq!(get_active_file_visibility(&settings), FileVisibility::All);
    assert!(get_active_hidden_files(&settings).is_empty());
    assert!(get_active_hidden_file_name_patterns(&settings).is_empty());
}

#[test]
fn test_ensure_creates_default_and_migrates() {
    let mut settings = NavigatorSettings {
        excluded_folders: vec!["archive".to_string(), " ".to_string()],
        excluded_files: vec!["private".to_string()],
        ..Default::default()
    };

    assert!(ensure_vault_profiles(&mut settings));
    assert_eq!(settings.vault_profiles.len(), 1);
    assert_eq!(settings.vault_profile, DEFAULT_VAULT_PROFILE_ID);
    let profile = &settings.vault_profiles[0];
    assert!(profile.is_default());
    assert_eq!(profile.hidden_folders, vec!["archive".to_string()]);
    assert_eq!(profile.hidden_files, vec!["private".to_string()]);
    assert!(settings.excluded_folders.is_empty());

    assert!(!ensure_vault_profiles(&mut settings));
}

#[test]
fn test_ensure_repairs_ids_and_active() {
    let mut nameless = VaultProfile::new("");
    nameless.id.clear();
    let mut settings = settings_with(vec![nameless], "gone");

    assert!(ensure_vault_profiles(&mut settings));
    let profile = &settings.vault_profiles[0];
    assert!(!profile.id.is_empty());
    assert_eq!(settings.vault_profile, profile.id);
    assert_eq!(profile.display_name(), DEFAULT_VAULT_PROFILE_NAME);
}

#[test]
fn test_create_rename_delete() {
    let mut settings = NavigatorSettings::default();
    ensure_vault_profiles(&mut settings);
    settings.vault_profiles[0].hidden_tags.push("secret".to_string());

    let id = create_vault_profile(&mut settings, " Reading ", Some(DEFAULT_VAULT_PROFILE_ID))
        .unwrap();
    let created = settings.vault_profiles.iter().find(|p| p.id == id).unwrap();
    assert_eq!(created.name, "Reading");
    assert_eq!(created.hidden_tags, vec!["secret".to_string()]);
    assert!(!created.is_default());

    assert_eq!(
        create_vault_profile(&mut settings, "reading", None),
        Err(ProfileError::DuplicateName("reading".to_string()))
    );
    assert_eq!(
        create_vault_profile(&mut settings, "  ", None),
        Err(ProfileError::EmptyName)
    );
    assert_eq!(
        create_vault_profile(&mut settings, "X", Some("nope")),
        Err(ProfileError::UnknownProfile("nope".to_string()))
    );

    rename_vault_profile(&mut settings, &id, "READING").unwrap();
    assert_eq!(
        rename_vault_profile(&mut settings, &id, "default"),
        Err(ProfileError::DuplicateName("default".to_string()))
    );

    set_active_vault_profile(&mut settings, &id).unwrap();
    assert!(set_active_vault_profile(&mut settings, "nope").is_err());

    assert_eq!(
        delete_vault_profile(&mut settings, DEFAULT_VAULT_PROFILE_ID),
        Err(ProfileError::CannotDeleteDefault)
    );
    let removed = delete_vault_profile(&mut settings, &id).unwrap();
    assert_eq!(removed.name, "READING");
    assert_eq!(settings.vault_profile, DEFAULT_VAULT_PROFILE_ID);
}

#[test]
fn test_cannot_delete_last() {
    let only = VaultProfile::new("Only");
    let id = only.id.clone();
    let mut settings = settings_with(vec![only], &id);
    assert_eq!(
        delete_vault_profile(&mut settings, &id),
        Err(ProfileError::CannotDeleteLast)
    );
}

#[test]
fn test_file_visibility() {
    assert!(FileVisibility::Documents.allows("a/note.md"));
    assert!(FileVisibility::Documents.allows("Board.CANVAS"));
    assert!(!FileVisibility::Documents.allows("scan.pdf"));
    assert!(FileVisibility::Supported.allows("scan.pdf"));
    assert!(FileVisibility::Supported.allows("photo.JPG"));
    assert!(!FileVisibility::Supported.allows("archive.zip"));
    assert!(FileVisibility::All.allows("archive.zip"));
    assert!(FileVisibility::All.allows("Makefile"));
}
