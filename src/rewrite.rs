//! Applying resolved tokens back onto document elements.

use crate::dom::Document;
use crate::extract::AssetRef;
use crate::query;

/// Rewrites the reference's URL attribute when the canonical token differs
/// from the declared one. Returns whether the element was touched.
///
/// Only the version parameter changes; every other parameter keeps its
/// position and value. References that already carry their canonical token
/// are left alone so their markup survives byte for byte.
pub fn rewrite_if_changed(
    doc: &mut Document,
    reference: &AssetRef,
    canonical: &str,
    version_param: &str,
) -> bool {
    if canonical == reference.declared {
        return false;
    }
    let mut params = reference.params.clone();
    query::set_pair(&mut params, version_param, canonical);
    let url = format!(
        "{}?{}",
        reference.file_path,
        query::serialize_pairs(&params)
    );
    doc.set_attr(reference.node, reference.kind.url_attr(), &url);
    true
}
