//! Small helpers around vault-relative paths.
//!
//! The host hands out paths like `folder/sub/note.md`, without a leading slash, with `/` as the
//! only separator. Nothing here touches the file system.

/// Borrowed view of a vault path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VaultPath<'a> {
    path: &'a str,
}

impl<'a> VaultPath<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path: path.trim_matches('/'),
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.path
    }

    /// The vault root is the empty path.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Last path component including the extension.
    pub fn name(&self) -> &'a str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[(pos + 1)..],
            None => self.path,
        }
    }

    /// File name without its extension. Dot files (`.obsidian`) keep their full name.
    pub fn basename(&self) -> &'a str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }

    /// Extension without the dot, empty if there is none.
    pub fn extension(&self) -> &'a str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => "",
            Some(pos) => &name[(pos + 1)..],
        }
    }

    /// The containing folder, `None` for the root itself. Top level entries have the root as
    /// parent.
    pub fn parent(&self) -> Option<VaultPath<'a>> {
        if self.is_root() {
            return None;
        }
        Some(match self.path.rfind('/') {
            Some(pos) => VaultPath {
                path: &self.path[..pos],
            },
            None => VaultPath { path: "" },
        })
    }

    /// Iterate over the containing folders, nearest first, excluding the vault root.
    pub fn ancestors(self) -> impl Iterator<Item = VaultPath<'a>> + 'a {
        let mut current = self.parent();
        std::iter::from_fn(move || {
            let this = current.filter(|folder| !folder.is_root())?;
            current = this.parent();
            Some(this)
        })
    }

    pub fn segments(&self) -> Vec<&'a str> {
        crate::pattern::split_segments(self.path)
    }

    pub fn is_markdown(&self) -> bool {
        self.extension().eq_ignore_ascii_case("md")
    }
}

/// Normalize a path for lookups: trimmed, without surrounding slashes, case-folded.
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_lowercase()
}

/// Normalize a tag: trimmed, without `#` and surrounding slashes, case-folded.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .trim_start_matches('#')
        .trim_matches('/')
        .to_lowercase()
}

#[test]
fn test_names() {
    let path = VaultPath::new("Projects/Alpha/Meeting Notes.md");
    assert_eq!(path.name(), "Meeting Notes.md");
    assert_eq!(path.basename(), "Meeting Notes");
    assert_eq!(path.extension(), "md");
    assert!(path.is_markdown());

    let path = VaultPath::new("archive.tar.gz");
    assert_eq!(path.basename(), "archive.tar");
    assert_eq!(path.extension(), "gz");

    let path = VaultPath::new("folder/.hidden");
    assert_eq!(path.basename(), ".hidden");
    assert_eq!(path.extension(), "");
}

#[test]
fn test_ancestors() {
    let path = VaultPath::new("/a/b/c/note.md");
    let ancestors: Vec<&str> = path.ancestors().map(|p| p.as_str()).collect();
    assert_eq!(ancestors, vec!["a/b/c", "a/b", "a"]);

    assert_eq!(VaultPath::new("note.md").ancestors().count(), 0);
    assert_eq!(VaultPath::new("note.md").parent().map(|p| p.is_root()), Some(true));
    assert_eq!(VaultPath::new("").parent(), None);
}

#[test]
fn test_normalize() {
    assert_eq!(normalize_path(" /Projects/Alpha/ "), "projects/alpha");
    assert_eq!(normalize_tag("#Work/Client/"), "work/client");
}
