use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every path under the public root.
pub const PUBLIC_PREFIX: &str = "/public/";

/// Which of the two storage roots holds a record.
///
/// Private records live under `/data/...` and stay on this device's drive
/// view; public records live under `/public/data/...` and are discoverable
/// by peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    /// The path is authoritative: anything under `/public/` is public.
    pub fn from_path(path: &str) -> Self {
        Self::from_public(path.starts_with(PUBLIC_PREFIX))
    }

    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Private => f.pad("private"),
            Visibility::Public => f.pad("public"),
        }
    }
}

/// Schema identity of a record kind.
///
/// `collection` names the directory (`bookmarks`), `tag` names a single
/// document in the envelope's `type` field (`unwalled.garden/bookmark`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub namespace: String,
    pub collection: String,
    pub tag: String,
}

impl RecordType {
    pub fn new(
        namespace: impl Into<String>,
        collection: impl Into<String>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            collection: collection.into(),
            tag: tag.into(),
        }
    }

    pub fn bookmark() -> Self {
        Self::new("unwalled.garden", "bookmarks", "bookmark")
    }

    /// Value written to the document's `type` field.
    pub fn type_tag(&self) -> String {
        format!("{}/{}", self.namespace, self.tag)
    }
}

/// A decoded user record. `visibility` is never read from the document;
/// it is derived from where the file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub href: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }
}

/// Input for `RecordStore::add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub href: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Visibility,
}

impl NewRecord {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Partial update for `RecordStore::update`. `None` keeps the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub href: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Overlay this patch on `old`. `created_at` always comes from `old`
    /// (or `now` if it never had one); `updated_at` is always `now`.
    pub fn apply(&self, old: &Record, now: DateTime<Utc>) -> Record {
        Record {
            href: self.href.clone().unwrap_or_else(|| old.href.clone()),
            title: self.title.clone().or_else(|| old.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| old.description.clone()),
            visibility: self.visibility.unwrap_or(old.visibility),
            created_at: Some(old.created_at.unwrap_or(now)),
            updated_at: Some(now),
        }
    }
}

/// Query result entry: a path plus whatever metadata the drive reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
}

impl FileEntry {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_path(&self.path)
    }
}

/// A file as read from the drive: its path and raw UTF-8 JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub content: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn old_record() -> Record {
        Record {
            href: "https://a/".into(),
            title: Some("Old".into()),
            description: Some("desc".into()),
            visibility: Visibility::Private,
            created_at: Some(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()),
            updated_at: None,
        }
    }

    #[test]
    fn visibility_from_path() {
        assert_eq!(
            Visibility::from_path("/public/data/x/bookmarks/a.json"),
            Visibility::Public
        );
        assert_eq!(
            Visibility::from_path("/data/x/bookmarks/a.json"),
            Visibility::Private
        );
        assert_eq!(Visibility::from_path("/publicity/a.json"), Visibility::Private);
    }

    #[test]
    fn bookmark_type_tag() {
        assert_eq!(RecordType::bookmark().type_tag(), "unwalled.garden/bookmark");
    }

    #[test]
    fn empty_patch_keeps_fields_and_refreshes_updated_at() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let merged = RecordPatch::new().apply(&old_record(), now);

        assert_eq!(merged.href, "https://a/");
        assert_eq!(merged.title.as_deref(), Some("Old"));
        assert_eq!(merged.description.as_deref(), Some("desc"));
        assert_eq!(merged.visibility, Visibility::Private);
        assert_eq!(merged.created_at, old_record().created_at);
        assert_eq!(merged.updated_at, Some(now));
    }

    #[test]
    fn patch_overrides_supplied_fields_only() {
        let now = Utc::now();
        let merged = RecordPatch::new()
            .title("New")
            .visibility(Visibility::Public)
            .apply(&old_record(), now);

        assert_eq!(merged.title.as_deref(), Some("New"));
        assert_eq!(merged.description.as_deref(), Some("desc"));
        assert!(merged.is_public());
    }

    #[test]
    fn missing_created_at_is_filled() {
        let now = Utc::now();
        let mut old = old_record();
        old.created_at = None;
        let merged = RecordPatch::new().apply(&old, now);
        assert_eq!(merged.created_at, Some(now));
    }
}
