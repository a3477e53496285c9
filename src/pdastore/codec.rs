//! # Record Codec
//!
//! On-disk shape of a record (pretty-printed, two-space indent, fixed key
//! order):
//!
//! ```text
//! {
//!   "type": "unwalled.garden/bookmark",
//!   "href": "https://example.com",
//!   "title": "Example",
//!   "description": "...",
//!   "createdAt": "2019-01-01T00:00:00.000Z",
//!   "updatedAt": "2019-01-02T00:00:00.000Z"
//! }
//! ```
//!
//! Absent optional fields are omitted. Visibility is never stored in the
//! document: [`decode`] derives it from the file's path.

use crate::error::{Result, StoreError};
use crate::model::{Record, RecordType, StoredFile, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(rename = "type")]
    kind: String,
    href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, with = "iso8601", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601", skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Serialize a record for storage.
pub fn encode(record_type: &RecordType, record: &Record) -> Result<Vec<u8>> {
    let doc = Document {
        kind: record_type.type_tag(),
        href: record.href.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Parse a stored file into a record of the given type.
///
/// Malformed JSON, a foreign `type` tag or an empty `href` are all errors;
/// callers that iterate many files treat them as "absent" and move on.
pub fn decode(record_type: &RecordType, file: &StoredFile) -> Result<Record> {
    let doc: Document = serde_json::from_slice(&file.content)?;

    let expected = record_type.type_tag();
    if doc.kind != expected {
        return Err(StoreError::InvalidRecord(format!(
            "{}: expected type {}, found {}",
            file.path, expected, doc.kind
        )));
    }
    if doc.href.trim().is_empty() {
        return Err(StoreError::InvalidRecord(format!(
            "{}: empty href",
            file.path
        )));
    }

    Ok(Record {
        href: doc.href,
        title: doc.title,
        description: doc.description,
        visibility: Visibility::from_path(&file.path),
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2019-01-01T00:00:00.000Z`.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(visibility: Visibility) -> Record {
        Record {
            href: "https://example.com/".into(),
            title: Some("Example".into()),
            description: Some("An example".into()),
            visibility,
            created_at: Some(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()),
            updated_at: Some(Utc.with_ymd_and_hms(2019, 1, 2, 3, 4, 5).unwrap()),
        }
    }

    fn stored(path: &str, content: &[u8]) -> StoredFile {
        StoredFile {
            path: path.to_string(),
            content: content.to_vec(),
        }
    }

    #[test]
    fn encodes_stable_pretty_json() {
        let bytes = encode(&RecordType::bookmark(), &record(Visibility::Public)).unwrap();
        let expected = r#"{
  "type": "unwalled.garden/bookmark",
  "href": "https://example.com/",
  "title": "Example",
  "description": "An example",
  "createdAt": "2019-01-01T00:00:00.000Z",
  "updatedAt": "2019-01-02T03:04:05.000Z"
}"#;
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn omits_absent_fields() {
        let mut r = record(Visibility::Private);
        r.description = None;
        r.updated_at = None;
        let text = String::from_utf8(encode(&RecordType::bookmark(), &r).unwrap()).unwrap();
        assert!(!text.contains("description"));
        assert!(!text.contains("updatedAt"));
        assert!(!text.contains("isPublic"));
    }

    #[test]
    fn visibility_comes_from_path_not_payload() {
        let rt = RecordType::bookmark();
        let bytes = encode(&rt, &record(Visibility::Private)).unwrap();

        let public = decode(&rt, &stored("/public/data/unwalled.garden/bookmarks/x.json", &bytes))
            .unwrap();
        assert_eq!(public, record(Visibility::Public));

        let private = decode(&rt, &stored("/data/unwalled.garden/bookmarks/x.json", &bytes))
            .unwrap();
        assert_eq!(private, record(Visibility::Private));
    }

    #[test]
    fn in_document_flag_is_ignored() {
        let rt = RecordType::bookmark();
        let json = br#"{"type":"unwalled.garden/bookmark","href":"https://a","isPublic":true}"#;
        let decoded = decode(&rt, &stored("/data/unwalled.garden/bookmarks/a.json", json)).unwrap();
        assert_eq!(decoded.visibility, Visibility::Private);
        assert_eq!(decoded.title, None);
        assert_eq!(decoded.created_at, None);
    }

    #[test]
    fn accepts_offset_timestamps() {
        let rt = RecordType::bookmark();
        let json = br#"{"type":"unwalled.garden/bookmark","href":"https://a","createdAt":"2019-01-01T02:00:00+02:00"}"#;
        let decoded = decode(&rt, &stored("/data/a.json", json)).unwrap();
        assert_eq!(
            decoded.created_at,
            Some(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        let rt = RecordType::bookmark();
        let cases: [&[u8]; 4] = [
            b"not json",
            br#"{"type":"unwalled.garden/profile","href":"https://a"}"#,
            br#"{"type":"unwalled.garden/bookmark","href":"  "}"#,
            br#"{"type":"unwalled.garden/bookmark","href":"https://a","createdAt":"yesterday"}"#,
        ];
        for content in cases {
            assert!(decode(&rt, &stored("/data/a.json", content)).is_err());
        }
    }
}
