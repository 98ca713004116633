//! The per-document normalization pipeline.
//!
//! One call ties the stages together for a single HTML document: parse,
//! extract candidate references, resolve each one to its canonical token
//! through the registry, rewrite the references that changed, serialize.

use std::path::Path;

use tracing::debug;

use crate::config::NormalizeConfig;
use crate::dom::Document;
use crate::error::NormalizeError;
use crate::extract::extract_refs;
use crate::registry::TokenRegistry;
use crate::rewrite::rewrite_if_changed;

/// Normalizes one document with a fresh registry.
///
/// This is the entry point for a single site: token state starts empty and
/// is dropped when the call returns, so nothing carries over between
/// documents or directories.
pub async fn normalize_document(
    html: &str,
    working_dir: &Path,
    cfg: &NormalizeConfig,
) -> Result<String, NormalizeError> {
    let mut registry = TokenRegistry::new();
    normalize_document_with_registry(html, working_dir, cfg, &mut registry).await
}

/// Normalizes one document against a caller-supplied registry.
///
/// Several documents served from the same directory may share a registry so
/// their tokens converge; a registry must never be shared across site
/// directories.
pub async fn normalize_document_with_registry(
    html: &str,
    working_dir: &Path,
    cfg: &NormalizeConfig,
    registry: &mut TokenRegistry,
) -> Result<String, NormalizeError> {
    cfg.validate()?;

    let mut doc = Document::parse(html);
    let refs = extract_refs(&doc, cfg);

    // One reference at a time: each resolution must observe the registry
    // state left by the previous one.
    let mut resolved = Vec::with_capacity(refs.len());
    for reference in refs {
        let canonical = registry
            .resolve(working_dir, &reference.file_path, &reference.declared)
            .await?;
        resolved.push((reference, canonical));
    }

    let mut changed = 0usize;
    for (reference, canonical) in &resolved {
        if rewrite_if_changed(&mut doc, reference, canonical, &cfg.version_param) {
            changed += 1;
        }
    }
    debug!(
        references = resolved.len(),
        changed,
        dir = %working_dir.display(),
        "normalized document"
    );

    Ok(doc.serialize())
}
