//! # pdastore Architecture
//!
//! pdastore persists user data (bookmarks, profiles, settings) as JSON
//! documents on a versioned, peer-replicated drive. The drive offers
//! path-addressed reads, writes, unlinks and glob queries with per-path
//! consistency; everything else is built here.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs)                                     │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Store (store.rs) + Legacy Migration (legacy.rs)     │
//! │  - add / update / remove / list / get                       │
//! │  - visibility moves, update-of-missing fallback             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!        slug.rs          router.rs         query.rs / codec.rs
//!        href → slug      slug → path       path → file → record
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Drive (drive/)                                             │
//! │  - Abstract Drive trait                                     │
//! │  - FsDrive (directory), MemDrive (testing)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Namespace
//!
//! ```text
//! /data/<namespace>/<collection>/<slug>.json           private
//! /public/data/<namespace>/<collection>/<slug>.json    public
//! ```
//!
//! The path is the primary key. There are no ids and no index files.
//!
//! ## Module Overview
//!
//! - [`store`]: the record store, entry point for all record operations
//! - [`legacy`]: one-shot import from the prior SQLite store
//! - [`slug`]: href normalization and slugification
//! - [`router`]: namespace paths
//! - [`query`]: file lookup across both roots
//! - [`codec`]: the JSON document envelope
//! - [`drive`]: storage abstraction and implementations
//! - [`model`]: core data types (`Record`, `RecordPatch`, `Visibility`)
//! - [`config`]: configuration file
//! - [`error`]: error types

pub mod codec;
pub mod config;
pub mod drive;
pub mod error;
pub mod legacy;
pub mod model;
pub mod query;
pub mod router;
pub mod slug;
pub mod store;
