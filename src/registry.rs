//! Canonical version token resolution.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::NormalizeError;
use crate::hash;

/// Token bookkeeping for one referenced file path.
#[derive(Debug, Default)]
struct FileTokenState {
    /// Declared token -> canonical token it resolved to. A token recorded
    /// here is never hashed again, even if the file has since changed or
    /// disappeared.
    declared_to_canonical: HashMap<String, String>,
    /// Content digest -> the first declared token observed for it.
    digest_to_canonical: HashMap<String, String>,
}

/// Registry mapping `(file path, declared token)` pairs to canonical tokens
/// for the lifetime of one normalization run.
///
/// The first declared token observed for a content digest becomes that
/// digest's canonical token; every later reference whose file hashes to the
/// same digest converges on it. State is keyed per file path, so the same
/// digest under two different paths resolves independently. Callers create
/// one registry per run and drop it afterwards; nothing leaks across runs.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    files: HashMap<String, FileTokenState>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the canonical token for `declared` on `file_path`.
    ///
    /// Reads and hashes the file only for declared tokens not seen before
    /// on this path; repeated tokens are answered from memory.
    pub async fn resolve(
        &mut self,
        working_dir: &Path,
        file_path: &str,
        declared: &str,
    ) -> Result<String, NormalizeError> {
        let state = self.files.entry(file_path.to_string()).or_default();
        if let Some(canonical) = state.declared_to_canonical.get(declared) {
            return Ok(canonical.clone());
        }

        let digest = hash::digest_file(working_dir, file_path).await?;
        let canonical = state
            .digest_to_canonical
            .entry(digest)
            .or_insert_with(|| declared.to_string())
            .clone();
        state
            .declared_to_canonical
            .insert(declared.to_string(), canonical.clone());
        debug!(
            file = file_path,
            declared,
            canonical = %canonical,
            "resolved version token"
        );
        Ok(canonical)
    }
}
