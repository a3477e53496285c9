//! # Slug Canonicalizer
//!
//! Records are keyed by an external href, but the drive is keyed by path.
//! [`to_slug`] bridges the two: it normalizes the href and turns it into a
//! filesystem-safe file stem.
//!
//! A slug has two parts:
//!
//! ```text
//! http-example-com-path-3f1c0b9e2a7d
//! └──── readable ─────┘ └── hash ──┘
//! ```
//!
//! The readable part is lossy (case and punctuation are folded away), so the
//! hash of the full normalized href is appended to keep distinct hrefs apart.
//! The output alphabet is `[a-z0-9-]`; a slug can never contain a separator
//! or a `..` segment.
//!
//! Normalization keeps fragments, `www.` prefixes and query parameters, and
//! strips the trailing slash. If the href cannot be normalized the raw string
//! is slugified instead, so [`to_slug`] never fails.

use sha2::{Digest, Sha256};
use thiserror::Error;

const MAX_READABLE_LEN: usize = 64;
const HASH_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("empty url")]
    Empty,

    #[error("url has no host")]
    MissingHost,

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// Canonical slug for an href. Pure and total.
pub fn to_slug(href: &str) -> String {
    let normalized = normalize_url(href).unwrap_or_else(|_| href.to_string());
    slugify_url(&normalized)
}

/// Normalize a URL-like string.
///
/// Scheme and host are lowercased, credentials and default ports dropped,
/// the path is cleaned of duplicate slashes, dot segments and its trailing
/// slash, and query pairs are sorted by key. Path case, query values,
/// fragments and `www.` are preserved.
pub fn normalize_url(input: &str) -> Result<String, NormalizeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let (scheme, rest) = match trimmed.strip_prefix("//") {
        Some(rest) => ("http".to_string(), rest),
        None => match split_scheme(trimmed) {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("http".to_string(), trimmed),
        },
    };

    let authority_end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    let host_port = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);
    let (host, port) = split_host_port(host_port)?;

    let mut out = format!("{}://{}", scheme, host);
    if let Some(port) = port {
        if default_port(&scheme) != Some(port) {
            out.push_str(&format!(":{}", port));
        }
    }

    let (before_fragment, fragment) = match tail.split_once('#') {
        Some((before, fragment)) => (before, Some(fragment)),
        None => (tail, None),
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (before_fragment, None),
    };

    out.push_str(&encode_spaces(&normalize_path(path)));

    if let Some(query) = query {
        let query = normalize_query(query);
        if !query.is_empty() {
            out.push('?');
            out.push_str(&encode_spaces(&query));
        }
    }

    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        out.push('#');
        out.push_str(&encode_spaces(fragment));
    }

    Ok(out)
}

/// Turn an already-normalized URL into a slug.
pub fn slugify_url(url: &str) -> String {
    let decoded = urlencoding::decode(url)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| url.to_string());

    let mut readable = String::with_capacity(MAX_READABLE_LEN);
    let mut pending_dash = false;
    for c in decoded.chars() {
        if !c.is_ascii_alphanumeric() {
            pending_dash = true;
            continue;
        }
        if readable.len() + usize::from(pending_dash) >= MAX_READABLE_LEN {
            break;
        }
        if pending_dash && !readable.is_empty() {
            readable.push('-');
        }
        pending_dash = false;
        readable.push(c.to_ascii_lowercase());
    }

    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let hash = &digest[..HASH_LEN];

    if readable.is_empty() {
        hash.to_string()
    } else {
        format!("{}-{}", readable, hash)
    }
}

fn split_scheme(s: &str) -> Option<(&str, &str)> {
    let idx = s.find("://")?;
    let scheme = &s[..idx];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some((scheme, &s[idx + 3..]))
}

fn split_host_port(host_port: &str) -> Result<(String, Option<u16>), NormalizeError> {
    if host_port.chars().any(char::is_whitespace) {
        return Err(NormalizeError::InvalidHost(host_port.to_string()));
    }

    let (host, port) = if host_port.starts_with('[') {
        let close = host_port
            .find(']')
            .ok_or_else(|| NormalizeError::InvalidHost(host_port.to_string()))?;
        let (host, after) = host_port.split_at(close + 1);
        let port = match after {
            "" => None,
            _ => Some(
                after
                    .strip_prefix(':')
                    .ok_or_else(|| NormalizeError::InvalidHost(host_port.to_string()))?,
            ),
        };
        let inner = &host[1..host.len() - 1];
        if inner.is_empty()
            || !inner
                .chars()
                .all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.'))
        {
            return Err(NormalizeError::InvalidHost(host.to_string()));
        }
        (host.to_ascii_lowercase(), port)
    } else {
        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        };
        let host = host.trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return Err(NormalizeError::MissingHost);
        }
        if !host
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '%'))
        {
            return Err(NormalizeError::InvalidHost(host));
        }
        (host, port)
    };

    let port = match port {
        None | Some("") => None,
        Some(p) => {
            if !p.chars().all(|c| c.is_ascii_digit()) {
                return Err(NormalizeError::InvalidPort(p.to_string()));
            }
            Some(
                p.parse::<u16>()
                    .map_err(|_| NormalizeError::InvalidPort(p.to_string()))?,
            )
        }
    };

    Ok((host, port))
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_by(|a, b| query_key(a).cmp(query_key(b)));
    pairs.join("&")
}

fn query_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}

fn encode_spaces(s: &str) -> String {
    s.replace(' ', "%20")
}
