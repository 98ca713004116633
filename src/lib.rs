//! Cache-busting version stamp normalization for static-site HTML.
//!
//! Build pipelines like to stamp asset URLs with `?v=<timestamp>` so
//! browsers refetch files that changed. When the stamp comes from a file's
//! mtime, republishing an unchanged file still mints a fresh stamp and
//! busts caches for nothing. This crate rewrites the stamps on
//! `<script src>` and `<link rel="stylesheet" href>` references so that
//! byte-identical file content always carries one stable token:
//!
//! - file content is digested (SHA-256) to recognize identical bytes
//!   hiding behind different stamps
//! - the first stamp observed for a digest becomes canonical for the run
//! - a stamp resolved once is memoized and never hashed again
//! - only elements whose stamp actually changes are rewritten; everything
//!   else keeps its original bytes
//!
//! Each site directory is normalized with fresh state. The binary walks a
//! root of site directories and prints each normalized document.
//!
//! ```no_run
//! use std::path::Path;
//! use vstamp::{normalize_document, NormalizeConfig};
//!
//! # async fn demo() -> Result<(), vstamp::NormalizeError> {
//! let html = r#"<html><head><script src="app.js?v=1700000000"></script></head></html>"#;
//! let out = normalize_document(html, Path::new("sites/alpha"), &NormalizeConfig::default()).await?;
//! println!("{out}");
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod dom;
mod error;
mod extract;
mod hash;
mod normalize;
mod query;
mod registry;
mod rewrite;

pub use crate::batch::{normalize_site_dir, run_batch, site_directories, SiteOutcome};
pub use crate::config::{BatchConfig, NormalizeConfig};
pub use crate::dom::{Document, NodeId};
pub use crate::error::{BatchError, NormalizeError};
pub use crate::extract::{extract_refs, AssetKind, AssetRef};
pub use crate::hash::{digest_file, hash_text};
pub use crate::normalize::{normalize_document, normalize_document_with_registry};
pub use crate::query::{get_pair, parse_pairs, serialize_pairs, set_pair};
pub use crate::registry::TokenRegistry;
pub use crate::rewrite::rewrite_if_changed;
