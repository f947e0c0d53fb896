//! Segment-wise path patterns as used for hidden folders and hidden tags.
//!
//! A pattern like `/projects/*/drafts` is split into `/`-separated segments, each of which is
//! either a literal or a wildcard segment (any segment containing a `*`). The number of leading
//! literal segments is the pattern's *literal prefix*, which decides whether renaming or
//! deleting a folder or tag has to touch the pattern.

use bitflags::bitflags;
use thiserror::Error;

use crate::glob::Glob;

bitflags! {
    /// Flags affecting how a pattern is normalized.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct PatternFlag: u8 {
        /// Case-fold the pattern. Values are case-folded before matching as well.
        const IGNORE_CASE = 0x01;

        /// The pattern must be anchored at the vault root with a leading slash. Patterns
        /// without it are rejected rather than silently rooted, so plain folder *names* are
        /// never mistaken for paths.
        const REQUIRE_ROOT = 0x02;

        /// The pattern is a tag path, a leading `#` is stripped.
        const TAG_PATH = 0x04;
    }
}

/// Error cases which may happen while parsing a pattern.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("empty pattern")]
    EmptyPattern,

    #[error("null-byte in pattern")]
    NulByte,

    #[error("pattern must start with '/'")]
    MissingRoot,
}

/// One segment of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A literal segment, `projects` in `/projects/*`.
    Literal(String),

    /// A segment containing at least one `*`. Matches exactly one path segment.
    Wildcard(Glob),
}

impl Segment {
    /// The segment text.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(literal) => literal,
            Segment::Wildcard(glob) => glob.as_str(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }

    /// Match a single (already case-folded if needed) path segment.
    pub fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == segment,
            Segment::Wildcard(glob) => glob.matches(segment),
        }
    }
}

/// A parsed path or tag pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    /// The normalized pattern text.
    raw: String,

    /// The segments we parsed out of the string.
    segments: Vec<Segment>,

    /// Number of leading literal segments.
    literal_prefix_len: usize,

    /// The pattern started with a slash.
    rooted: bool,

    flags: PatternFlag,
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// Malformed input yields an error; callers processing free-text pattern lists are expected
    /// to simply skip those.
    pub fn parse<T: AsRef<str>>(pattern: T, flags: PatternFlag) -> Result<Self, ParseError> {
        Self::parse_do(pattern.as_ref(), flags)
    }

    fn parse_do(pattern: &str, flags: PatternFlag) -> Result<Self, ParseError> {
        let mut pattern = pattern.trim();
        if flags.intersects(PatternFlag::TAG_PATH) {
            pattern = pattern.trim_start_matches('#');
        }

        if pattern.is_empty() {
            return Err(ParseError::EmptyPattern);
        }

        if pattern.contains('\0') {
            return Err(ParseError::NulByte);
        }

        let rooted = pattern.starts_with('/');
        if flags.intersects(PatternFlag::REQUIRE_ROOT) && !rooted {
            return Err(ParseError::MissingRoot);
        }

        let folded;
        let pattern = if flags.intersects(PatternFlag::IGNORE_CASE) {
            folded = pattern.to_lowercase();
            folded.as_str()
        } else {
            pattern
        };

        let segments: Vec<Segment> = pattern
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment.contains('*') {
                    Segment::Wildcard(Glob::compile(segment))
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        if segments.is_empty() {
            return Err(ParseError::EmptyPattern);
        }

        let literal_prefix_len = segments
            .iter()
            .position(|segment| !segment.is_literal())
            .unwrap_or(segments.len());

        Ok(Self {
            raw: join_segments(rooted, segments.iter().map(Segment::as_str)),
            segments,
            literal_prefix_len,
            rooted,
            flags,
        })
    }

    /// The normalized pattern text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of leading literal segments before the first wildcard segment. This is the full
    /// segment count for purely literal patterns and 0 for patterns starting with a wildcard.
    pub fn literal_prefix_len(&self) -> usize {
        self.literal_prefix_len
    }

    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// Whether the pattern contains no wildcard segment at all.
    pub fn is_literal(&self) -> bool {
        self.literal_prefix_len == self.segments.len()
    }

    /// Match a list of path segments, segment for segment.
    ///
    /// The segments are case-folded first if this pattern was parsed with
    /// [`PatternFlag::IGNORE_CASE`].
    pub fn matches_segments<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        if segments.len() != self.segments.len() {
            return false;
        }

        let ignore_case = self.flags.intersects(PatternFlag::IGNORE_CASE);
        self.segments.iter().zip(segments).all(|(pattern, segment)| {
            let segment = segment.as_ref();
            if ignore_case {
                pattern.matches(&segment.to_lowercase())
            } else {
                pattern.matches(segment)
            }
        })
    }

    /// Check whether the literal prefix of this pattern begins with exactly these segments.
    ///
    /// Comparison is case-insensitive. An empty `segments` list never matches.
    pub fn literal_prefix_starts_with<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        !segments.is_empty()
            && segments.len() <= self.literal_prefix_len
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(pattern, segment)| segments_equal(pattern.as_str(), segment.as_ref()))
    }

    /// Check whether this pattern is purely literal and consists of exactly these segments.
    pub fn literal_equals<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        self.is_literal()
            && self.segments.len() == segments.len()
            && self.literal_prefix_starts_with(segments)
    }

    /// Replace the leading `previous` segments with `next`, keeping all following literal and
    /// wildcard segments. Returns `None` if the literal prefix does not start with `previous`.
    pub fn replace_literal_prefix<S, N>(&self, previous: &[S], next: &[N]) -> Option<String>
    where
        S: AsRef<str>,
        N: AsRef<str>,
    {
        if !self.literal_prefix_starts_with(previous) {
            return None;
        }

        let tail = self.segments[previous.len()..].iter().map(Segment::as_str);
        Some(join_segments(
            self.rooted,
            next.iter().map(AsRef::as_ref).chain(tail),
        ))
    }
}

fn join_segments<'a, I>(rooted: bool, segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for (index, segment) in segments.into_iter().enumerate() {
        if rooted || index > 0 {
            out.push('/');
        }
        out.push_str(segment);
    }
    out
}

/// Case-insensitive segment comparison.
pub(crate) fn segments_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Split a vault path or tag path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[test]
fn test_parse_segments() {
    let pattern = PathPattern::parse("/Projects/*/drafts", PatternFlag::IGNORE_CASE).unwrap();
    assert_eq!(pattern.raw(), "/projects/*/drafts");
    assert!(pattern.is_rooted());
    assert_eq!(pattern.segments().len(), 3);
    assert_eq!(pattern.literal_prefix_len(), 1);
    assert!(!pattern.is_literal());

    let pattern = PathPattern::parse("  /a//b/  ", PatternFlag::empty()).unwrap();
    assert_eq!(pattern.raw(), "/a/b");
    assert_eq!(pattern.literal_prefix_len(), 2);
    assert!(pattern.is_literal());

    let pattern = PathPattern::parse("*draft", PatternFlag::empty()).unwrap();
    assert_eq!(pattern.literal_prefix_len(), 0);
    assert!(!pattern.is_rooted());
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        PathPattern::parse("", PatternFlag::empty()),
        Err(ParseError::EmptyPattern)
    );
    assert_eq!(
        PathPattern::parse("   ", PatternFlag::empty()),
        Err(ParseError::EmptyPattern)
    );
    assert_eq!(
        PathPattern::parse("/", PatternFlag::REQUIRE_ROOT),
        Err(ParseError::EmptyPattern)
    );
    assert_eq!(
        PathPattern::parse("archive", PatternFlag::REQUIRE_ROOT),
        Err(ParseError::MissingRoot)
    );
    assert_eq!(
        PathPattern::parse("a\0b", PatternFlag::empty()),
        Err(ParseError::NulByte)
    );
    assert_eq!(
        PathPattern::parse("#", PatternFlag::TAG_PATH),
        Err(ParseError::EmptyPattern)
    );
}

#[test]
fn test_tag_pattern() {
    let pattern =
        PathPattern::parse("#Archive/Old", PatternFlag::TAG_PATH | PatternFlag::IGNORE_CASE)
            .unwrap();
    assert_eq!(pattern.raw(), "archive/old");
    assert!(pattern.matches_segments(&["ARCHIVE", "old"]));
    assert!(!pattern.matches_segments(&["archive"]));
}

#[test]
fn test_matches_segments() {
    let pattern = PathPattern::parse("/projects/*", PatternFlag::IGNORE_CASE).unwrap();
    assert!(pattern.matches_segments(&["projects", "alpha"]));
    assert!(pattern.matches_segments(&["Projects", "beta"]));
    assert!(!pattern.matches_segments(&["projects"]));
    assert!(!pattern.matches_segments(&["projects", "alpha", "notes"]));

    let pattern = PathPattern::parse("/work/client-*", PatternFlag::IGNORE_CASE).unwrap();
    assert!(pattern.matches_segments(&["work", "client-acme"]));
    assert!(!pattern.matches_segments(&["work", "internal"]));
}

#[test]
fn test_replace_literal_prefix() {
    let pattern = PathPattern::parse("/projects/*", PatternFlag::REQUIRE_ROOT).unwrap();
    assert_eq!(
        pattern.replace_literal_prefix(&["projects"], &["work"]),
        Some("/work/*".to_string())
    );
    assert_eq!(
        pattern.replace_literal_prefix(&["projects", "x"], &["work", "x"]),
        None
    );

    let pattern = PathPattern::parse("/Projects/Drafts/*", PatternFlag::REQUIRE_ROOT).unwrap();
    assert_eq!(
        pattern.replace_literal_prefix(&["projects"], &["Work", "2024"]),
        Some("/Work/2024/Drafts/*".to_string())
    );

    let pattern = PathPattern::parse("/projects-archive", PatternFlag::REQUIRE_ROOT).unwrap();
    assert_eq!(pattern.replace_literal_prefix(&["projects"], &["work"]), None);
}

#[test]
fn test_literal_equals() {
    let pattern = PathPattern::parse("/projects", PatternFlag::REQUIRE_ROOT).unwrap();
    assert!(pattern.literal_equals(&["Projects"]));
    assert!(!pattern.literal_equals(&["projects", "drafts"]));

    let pattern = PathPattern::parse("/projects/drafts", PatternFlag::REQUIRE_ROOT).unwrap();
    assert!(!pattern.literal_equals(&["projects"]));

    let pattern = PathPattern::parse("/projects/*", PatternFlag::REQUIRE_ROOT).unwrap();
    assert!(!pattern.literal_equals(&["projects"]));
}
