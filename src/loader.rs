// ABOUTME: Loads a local markdown file into a transformed Article
// ABOUTME: Parses front matter, applies body rules, and fingerprints the result

use crate::error::LoadError;
use crate::model::{render_document, split_front_matter, Article, FrontMatter};
use crate::transform::{self, TransformContext};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads and loads the article at `path`.
pub fn load_article(path: &Path, site: Option<&str>) -> Result<Article, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_article(&content, path, site)
}

/// Builds an article from raw file contents.
///
/// The fingerprint covers the fully transformed document with any stored
/// `checksum` removed, so it only changes when publishable content changes.
pub fn parse_article(content: &str, path: &Path, site: Option<&str>) -> Result<Article, LoadError> {
    let content = content.replace("\r\n", "\n");
    let (yaml, raw_body) = split_front_matter(&content).unwrap_or(("", content.as_str()));

    let front_matter: FrontMatter = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml).map_err(|e| LoadError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let title = match front_matter.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => {
            return Err(LoadError::MissingTitle {
                path: path.to_path_buf(),
            })
        }
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let ctx = TransformContext { site, base_dir };
    let body = transform::apply(raw_body, &ctx);

    let mut article = Article {
        title,
        tags: transform::normalize_tags(&front_matter.tags),
        cover_image: front_matter.cover_image,
        extra: front_matter.extra,
        body,
        source_path: path.to_path_buf(),
        fingerprint: String::new(),
    };

    let unsigned = render_document(&article.front_matter(None), &article.body).map_err(|e| {
        LoadError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    article.fingerprint = fingerprint(&unsigned);
    debug!(title = %article.title, fingerprint = %article.fingerprint, "loaded article");

    Ok(article)
}

/// Hex content digest used for change detection.
pub fn fingerprint(document: &str) -> String {
    blake3::hash(document.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_path() -> PathBuf {
        PathBuf::from("articles/sample.md")
    }

    const SAMPLE: &str = "---\ntitle: A Test Message\ntags: [React-Native, CI]\npublished: false\n---\n\nFirst line\nsecond line\n";

    #[test]
    fn test_parse_article_basic() {
        let article = parse_article(SAMPLE, &sample_path(), None).unwrap();
        assert_eq!(article.title, "A Test Message");
        assert_eq!(article.tags, vec!["reactnative", "ci"]);
        assert_eq!(article.body, "First line second line\n");
        assert_eq!(article.source_dir(), Path::new("articles"));
        assert_eq!(
            article.extra.get("published"),
            Some(&serde_yaml::Value::Bool(false))
        );
        assert_eq!(article.fingerprint.len(), 64);
    }

    #[test]
    fn test_missing_title_is_error() {
        let err = parse_article("---\ntags: [a]\n---\n\nbody", &sample_path(), None).unwrap_err();
        assert!(matches!(err, LoadError::MissingTitle { .. }));

        let err = parse_article("---\ntitle: \"  \"\n---\n\nbody", &sample_path(), None).unwrap_err();
        assert!(matches!(err, LoadError::MissingTitle { .. }));

        let err = parse_article("no front matter", &sample_path(), None).unwrap_err();
        assert!(matches!(err, LoadError::MissingTitle { .. }));
    }

    #[test]
    fn test_malformed_front_matter_is_error() {
        let err = parse_article("---\ntitle: [unclosed\n---\n\nbody", &sample_path(), None)
            .unwrap_err();
        assert!(matches!(err, LoadError::FrontMatter { .. }));
    }

    #[test]
    fn test_load_article_unreadable() {
        let err = load_article(Path::new("/definitely/not/here.md"), None).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let b = parse_article(SAMPLE, &sample_path(), None).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_changes_with_body() {
        let a = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let b = parse_article(&SAMPLE.replace("second", "Second"), &sample_path(), None).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_ignores_stored_checksum() {
        let stored = SAMPLE.replace("published: false\n", "published: false\nchecksum: stale\n");
        let a = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let b = parse_article(&stored, &sample_path(), None).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_document_embeds_fingerprint() {
        let article = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let doc = article.to_document().unwrap();
        assert!(doc.starts_with("---\ntitle: A Test Message\n"));
        assert!(doc.contains(&format!("checksum: {}\n", article.fingerprint)));
        assert!(doc.ends_with("---\n\nFirst line second line\n"));
    }

    #[test]
    fn test_reloading_published_document_keeps_fingerprint() {
        let article = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let doc = article.to_document().unwrap();
        let reloaded = parse_article(&doc, &sample_path(), None).unwrap();
        assert_eq!(reloaded.fingerprint, article.fingerprint);
    }

    #[test]
    fn test_site_links_rewritten() {
        let content = "---\ntitle: Links\n---\n\nSee [about](/about).";
        let article = parse_article(content, &sample_path(), Some("https://me.dev")).unwrap();
        assert_eq!(article.body, "See [about](https://me.dev/about).");
    }

    #[test]
    fn test_crlf_input_matches_lf() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let a = parse_article(SAMPLE, &sample_path(), None).unwrap();
        let b = parse_article(&crlf, &sample_path(), None).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }
}
