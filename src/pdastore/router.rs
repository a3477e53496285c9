//! # Namespace Router
//!
//! Maps `(record type, slug, visibility)` to a drive path. The path is the
//! record's primary key; nothing else identifies a stored record.
//!
//! ```text
//! /data/<namespace>/<collection>/<slug>.json          private
//! /public/data/<namespace>/<collection>/<slug>.json   public
//! ```

use crate::model::{RecordType, Visibility};

const PRIVATE_ROOT: &str = "/data";
const PUBLIC_ROOT: &str = "/public/data";
const EXTENSION: &str = ".json";

fn collection_dir(record_type: &RecordType, visibility: Visibility) -> String {
    let root = match visibility {
        Visibility::Private => PRIVATE_ROOT,
        Visibility::Public => PUBLIC_ROOT,
    };
    format!(
        "{}/{}/{}",
        root, record_type.namespace, record_type.collection
    )
}

pub fn resolve_path(record_type: &RecordType, slug: &str, visibility: Visibility) -> String {
    format!(
        "{}/{}{}",
        collection_dir(record_type, visibility),
        slug,
        EXTENSION
    )
}

/// Both candidate paths, private first. Used when visibility is unknown.
pub fn resolve_both_paths(record_type: &RecordType, slug: &str) -> [String; 2] {
    [
        resolve_path(record_type, slug, Visibility::Private),
        resolve_path(record_type, slug, Visibility::Public),
    ]
}

/// Glob patterns covering every record of this type in both roots.
pub fn query_patterns(record_type: &RecordType) -> [String; 2] {
    [
        resolve_path(record_type, "*", Visibility::Private),
        resolve_path(record_type, "*", Visibility::Public),
    ]
}
