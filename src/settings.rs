//! The persisted navigator settings and their JSON persistence.
//!
//! The host keeps plugin settings as one JSON document. Only the parts relevant to hidden-item
//! filtering are typed here; every other key is carried along untouched so saving never drops
//! settings owned by other parts of the plugin.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::profile::{VaultProfile, ensure_vault_profiles};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorSettings {
    #[serde(default)]
    pub vault_profiles: Vec<VaultProfile>,

    /// Id of the active profile.
    #[serde(default)]
    pub vault_profile: String,

    /// Ignore all hidden-item rules.
    #[serde(default)]
    pub show_hidden_items: bool,

    /// Pre-profile folder exclusions, migrated by [`ensure_vault_profiles`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_folders: Vec<String>,

    /// Pre-profile frontmatter exclusions, migrated by [`ensure_vault_profiles`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_files: Vec<String>,

    /// Settings this crate does not know about.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl NavigatorSettings {
    /// Parse settings from JSON and bring the profiles into shape.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: NavigatorSettings = serde_json::from_str(json)?;
        if ensure_vault_profiles(&mut settings) {
            log::debug!("vault profiles were repaired after loading");
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file. A missing file yields default settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no settings at {path:?}, using defaults");
            let mut settings = Self::default();
            ensure_vault_profiles(&mut settings);
            return Ok(settings);
        }

        log::info!("loading settings from {path:?}");
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save settings, writing to a temporary file first and renaming it into place.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

#[test]
fn test_parse_host_json() {
    let settings = NavigatorSettings::from_json(
        r##"{
            "vaultProfile": "work",
            "showHiddenItems": false,
            "sortOrder": "modified-desc",
            "vaultProfiles": [
                { "id": "default", "name": "Default" },
                {
                    "id": "work",
                    "name": "Work",
                    "fileVisibility": "supported",
                    "hiddenFolders": ["/archive"],
                    "hiddenFiles": ["status=done"],
                    "hiddenFileNamePatterns": [".pdf"],
                    "hiddenTags": ["#private"],
                    "navigationBanner": "banner.md",
                    "shortcuts": [
                        { "type": "folder", "path": "projects" },
                        { "type": "tag", "tagPath": "work" }
                    ]
                }
            ]
        }"##,
    )
    .unwrap();

    assert_eq!(settings.vault_profile, "work");
    let work = &settings.vault_profiles[1];
    assert_eq!(work.file_visibility, crate::FileVisibility::Supported);
    assert_eq!(work.hidden_tags, vec!["#private".to_string()]);
    assert_eq!(work.navigation_banner.as_deref(), Some("banner.md"));
    assert_eq!(
        work.shortcuts[1],
        crate::Shortcut::Tag {
            tag_path: "work".to_string()
        }
    );
    assert_eq!(
        settings.other.get("sortOrder"),
        Some(&Value::String("modified-desc".to_string()))
    );

    let json = settings.to_json().unwrap();
    assert!(json.contains("\"sortOrder\""));
    assert!(json.contains("\"hiddenFileNamePatterns\""));
    assert!(!json.contains("excludedFolders"));
}

#[test]
fn test_empty_json_gets_default_profile() {
    let settings = NavigatorSettings::from_json("{}").unwrap();
    assert_eq!(settings.vault_profiles.len(), 1);
    assert_eq!(settings.vault_profile, crate::DEFAULT_VAULT_PROFILE_ID);
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        NavigatorSettings::from_json("{ nope"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_load_and_save() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("plugin").join("data.json");

    let mut settings = NavigatorSettings::load(&path).expect("Failed to load defaults");
    assert_eq!(settings.vault_profiles.len(), 1);

    settings.vault_profiles[0]
        .hidden_folders
        .push("/archive".to_string());
    settings.save(&path).expect("Failed to save settings");
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = NavigatorSettings::load(&path).expect("Failed to reload settings");
    assert_eq!(loaded, settings);
}
