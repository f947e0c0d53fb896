use std::sync::Arc;

use vaultfilter::*;

fn settings() -> NavigatorSettings {
    NavigatorSettings::from_json(
        r##"{
            "vaultProfile": "reading",
            "vaultProfiles": [
                {
                    "id": "default",
                    "name": "",
                    "hiddenFolders": ["/projects/*", "/projects-archive"]
                },
                {
                    "id": "reading",
                    "name": "Reading",
                    "fileVisibility": "all",
                    "hiddenFolders": ["/projects", "/projects/drafts", "*_temp"],
                    "hiddenFiles": ["status=archived", "tags=secret"],
                    "hiddenFileNamePatterns": [".pdf", "*.bak", "/inbox/scratch.md"],
                    "hiddenTags": ["#private", "projects/*"]
                }
            ]
        }"##,
    )
    .expect("valid settings")
}

fn metadata() -> InMemoryMetadata {
    let mut metadata = InMemoryMetadata::new();
    let frontmatter = |value: serde_json::Value| match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    };
    metadata.set_frontmatter(
        "notes/old.md",
        frontmatter(serde_json::json!({ "Status": "Archived" })),
    );
    metadata.set_frontmatter(
        "notes/mixed.md",
        frontmatter(serde_json::json!({ "tags": ["work", "SECRET"] })),
    );
    metadata.set_frontmatter(
        "notes/current.md",
        frontmatter(serde_json::json!({ "status": "active", "tags": ["work"] })),
    );
    metadata.set_tags("notes/health.md", ["#private/health"]);
    metadata.set_tags("notes/alpha.md", ["#projects/alpha"]);
    metadata.set_tags("notes/projects.md", ["#projects"]);
    metadata
}

#[test]
fn active_profile_drives_filtering() {
    let settings = settings();
    let cache = MatcherCache::new();
    let metadata = metadata();
    let state = FilterState::from_settings(&settings, &cache);

    let files = [
        "notes/old.md",
        "notes/mixed.md",
        "notes/current.md",
        "notes/health.md",
        "notes/alpha.md",
        "notes/projects.md",
        "papers/Paper.PDF",
        "notes/current.md.bak",
        "inbox/scratch.md",
        "inbox/keep.md",
        "tools/run.sh",
    ];
    assert_eq!(
        filter_files(files, &state, &metadata),
        vec![
            "notes/current.md",
            "notes/projects.md",
            "inbox/keep.md",
            "tools/run.sh",
        ]
    );

    assert_eq!(
        filter_folders(
            ["projects", "projects/drafts", "projectsx", "build_temp", "temp_build"],
            &state
        ),
        vec!["projectsx", "temp_build"]
    );
}

#[test]
fn show_hidden_items_lists_everything_visible() {
    let mut settings = settings();
    settings.show_hidden_items = true;
    let cache = MatcherCache::new();
    let metadata = metadata();
    let state = FilterState::from_settings(&settings, &cache)
        .check_excluded_folders(true);

    for path in ["notes/old.md", "papers/Paper.PDF", "projects/x.md", "notes/health.md"] {
        assert!(passes_exclusion_filters(path, &state, &metadata), "{path}");
    }
    assert!(filter_tags(["private", "projects/alpha"], &state).len() == 2);
}

#[test]
fn unknown_active_profile_falls_back_to_first() {
    let mut settings = settings();
    settings.vault_profile = "gone".to_string();

    let profile = get_active_vault_profile(&settings).expect("profiles exist");
    assert_eq!(profile.id, DEFAULT_VAULT_PROFILE_ID);
    assert_eq!(profile.display_name(), DEFAULT_VAULT_PROFILE_NAME);
    assert_eq!(
        get_active_hidden_folders(&settings),
        ["/projects/*", "/projects-archive"]
    );

    // loading repairs the dangling id for good
    let json = settings.to_json().expect("serializable");
    let reloaded = NavigatorSettings::from_json(&json).expect("valid settings");
    assert_eq!(reloaded.vault_profile, DEFAULT_VAULT_PROFILE_ID);
}

#[test]
fn matchers_are_shared_between_passes() {
    let settings = settings();
    let cache = MatcherCache::new();

    let profile = get_active_vault_profile(&settings).expect("profiles exist");
    let first = cache.file_name_matcher(&profile.hidden_file_name_patterns);
    let reordered = cache.file_name_matcher(&["  /Inbox/Scratch.md ", "*.BAK", ".pdf"]);
    assert!(Arc::ptr_eq(&first, &reordered));

    cache.clear_file_name_matchers();
    let rebuilt = cache.file_name_matcher(&profile.hidden_file_name_patterns);
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(first.matches("x/y.pdf"), rebuilt.matches("x/y.pdf"));
}

#[test]
fn rename_and_delete_keep_rules_consistent() {
    let mut settings = settings();

    assert!(update_hidden_folder_exact_matches(&mut settings, "projects", "work"));
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/work/*", "/projects-archive"]
    );
    assert_eq!(
        settings.vault_profiles[1].hidden_folders,
        vec!["/work", "/work/drafts", "*_temp"]
    );

    assert!(remove_hidden_folder_exact_matches(&mut settings, "work"));
    assert_eq!(
        settings.vault_profiles[1].hidden_folders,
        vec!["/work/drafts", "*_temp"]
    );
    assert_eq!(
        settings.vault_profiles[0].hidden_folders,
        vec!["/work/*", "/projects-archive"]
    );

    assert!(update_hidden_tag_prefix_matches(&mut settings, "private", "personal"));
    assert_eq!(
        get_active_hidden_tags(&settings),
        ["personal", "projects/*"]
    );
    assert!(remove_hidden_tag_prefix_matches(&mut settings, "#personal"));
    assert_eq!(get_active_hidden_tags(&settings), ["projects/*"]);
}

#[test]
fn profile_lifecycle() {
    let mut settings = settings();

    let id = create_vault_profile(&mut settings, "Focus", Some("reading")).expect("created");
    set_active_vault_profile(&mut settings, &id).expect("exists");
    assert_eq!(get_active_file_visibility(&settings), FileVisibility::All);

    let mut folders = get_active_hidden_folders(&settings).to_vec();
    folders.push("/inbox/old".to_string());
    // already hidden by "/projects"
    assert_eq!(cleanup_exclusion_patterns(&folders, "/projects/drafts/x"), folders);

    let folders = cleanup_exclusion_patterns(&folders, "/inbox");
    get_active_vault_profile_mut(&mut settings)
        .expect("profiles exist")
        .hidden_folders = folders;
    assert_eq!(
        get_active_hidden_folders(&settings),
        ["/projects", "/projects/drafts", "*_temp", "/inbox"]
    );

    delete_vault_profile(&mut settings, &id).expect("deletable");
    assert_eq!(settings.vault_profile, DEFAULT_VAULT_PROFILE_ID);
    assert_eq!(
        delete_vault_profile(&mut settings, DEFAULT_VAULT_PROFILE_ID),
        Err(ProfileError::CannotDeleteDefault)
    );
}
