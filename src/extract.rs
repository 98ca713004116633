//! Discovery of candidate asset references in a parsed document.
//!
//! A candidate is a `<script src>` or `<link rel="stylesheet" href>` whose
//! URL carries the version parameter with a non-empty value. Everything else
//! is out of scope and guaranteed untouched: inline scripts, links of other
//! rel values, URLs without a query, and URLs whose query cannot be decoded.

use crate::config::NormalizeConfig;
use crate::dom::{Document, NodeId};
use crate::query;

/// The kind of element a reference lives on; decides which attribute holds
/// the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Stylesheet,
}

impl AssetKind {
    pub fn url_attr(self) -> &'static str {
        match self {
            AssetKind::Script => "src",
            AssetKind::Stylesheet => "href",
        }
    }
}

/// One candidate reference, decomposed for resolution and rewriting.
#[derive(Debug, Clone)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub node: NodeId,
    /// URL path before the `?`. Used to locate the file; never rewritten.
    pub file_path: String,
    /// Decoded query pairs in their original order.
    pub params: Vec<(String, String)>,
    /// Value the version parameter arrived with.
    pub declared: String,
}

/// Collects candidates: scripts in document order first, then stylesheet
/// links in document order. Resolution follows this order, which decides
/// which declared token becomes canonical for a digest.
pub fn extract_refs(doc: &Document, cfg: &NormalizeConfig) -> Vec<AssetRef> {
    let elements = doc.elements();
    let mut refs = Vec::new();
    for &node in &elements {
        if doc.tag(node) == Some("script") {
            push_candidate(doc, node, AssetKind::Script, cfg, &mut refs);
        }
    }
    for &node in &elements {
        if is_stylesheet_link(doc, node) {
            push_candidate(doc, node, AssetKind::Stylesheet, cfg, &mut refs);
        }
    }
    refs
}

fn is_stylesheet_link(doc: &Document, node: NodeId) -> bool {
    doc.tag(node) == Some("link")
        && doc
            .attr(node, "rel")
            .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
}

fn push_candidate(
    doc: &Document,
    node: NodeId,
    kind: AssetKind,
    cfg: &NormalizeConfig,
    refs: &mut Vec<AssetRef>,
) {
    let Some(url) = doc.attr(node, kind.url_attr()) else {
        return;
    };
    let Some((file_path, raw_query)) = url.split_once('?') else {
        return;
    };
    let Some(params) = query::parse_pairs(raw_query) else {
        return;
    };
    let declared = match query::get_pair(&params, &cfg.version_param) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => return,
    };
    refs.push(AssetRef {
        kind,
        node,
        file_path: file_path.to_string(),
        params,
        declared,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<AssetRef> {
        let doc = Document::parse(html);
        extract_refs(&doc, &NormalizeConfig::default())
    }

    #[test]
    fn scripts_come_before_stylesheets_regardless_of_position() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="a.css?v=1">
            <script src="a.js?v=2"></script>
        </head></html>"#;
        let refs = extract(html);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, AssetKind::Script);
        assert_eq!(refs[0].file_path, "a.js");
        assert_eq!(refs[1].kind, AssetKind::Stylesheet);
        assert_eq!(refs[1].file_path, "a.css");
    }

    #[test]
    fn declared_token_and_params_are_captured() {
        let refs = extract(r#"<html><script src="js/app.js?x=1&v=1700&y=2"></script></html>"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].declared, "1700");
        assert_eq!(refs[0].file_path, "js/app.js");
        assert_eq!(
            refs[0].params,
            vec![
                ("x".to_string(), "1".to_string()),
                ("v".to_string(), "1700".to_string()),
                ("y".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn inline_scripts_are_skipped() {
        let refs = extract("<html><script>let v = 1;</script></html>");
        assert!(refs.is_empty());
    }

    #[test]
    fn urls_without_query_are_skipped() {
        let refs = extract(r#"<html><script src="app.js"></script></html>"#);
        assert!(refs.is_empty());
    }

    #[test]
    fn missing_or_empty_version_param_is_skipped() {
        let refs = extract(
            r#"<html>
                <script src="a.js?cache=1"></script>
                <script src="b.js?v="></script>
            </html>"#,
        );
        assert!(refs.is_empty());
    }

    #[test]
    fn undecodable_query_is_skipped() {
        let refs = extract(r#"<html><script src="a.js?v=%zz"></script></html>"#);
        assert!(refs.is_empty());
    }

    #[test]
    fn non_stylesheet_links_are_skipped() {
        let refs = extract(r#"<html><link rel="preload" href="a.css?v=1"></html>"#);
        assert!(refs.is_empty());
    }

    #[test]
    fn rel_match_is_case_insensitive() {
        let refs = extract(r#"<html><link rel="Stylesheet" href="a.css?v=1"></html>"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, AssetKind::Stylesheet);
    }

    #[test]
    fn custom_version_param_is_honored() {
        let doc = Document::parse(r#"<html><script src="a.js?rev=9&v=1"></script></html>"#);
        let cfg = NormalizeConfig {
            version_param: "rev".to_string(),
        };
        let refs = extract_refs(&doc, &cfg);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].declared, "9");
    }

    #[test]
    fn duplicate_version_params_use_the_first_value() {
        let refs = extract(r#"<html><script src="a.js?v=1&v=2"></script></html>"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].declared, "1");
    }
}
