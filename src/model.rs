// ABOUTME: Data models for local articles, front matter, and dev.to responses
// ABOUTME: Explicit named fields plus an ordered pass-through mapping for extra keys

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Front matter as stored in a markdown document.
///
/// Field order here is the order fields are written back out: known keys
/// first, then any unmodelled keys in their original order, then `checksum`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_tags",
        serialize_with = "serialize_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    List(Vec<Value>),
    Inline(String),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<TagsRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TagsRepr::Inline(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(TagsRepr::List(values)) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
    };
    Ok(tags)
}

// dev.to reads tags as a comma-separated string
fn serialize_tags<S>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&tags.join(", "))
}

/// A local markdown article after loading and transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub extra: Mapping,
    pub body: String,
    pub source_path: PathBuf,
    pub fingerprint: String,
}

impl Article {
    /// Directory relative image and code-import paths resolve against.
    pub fn source_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn front_matter(&self, checksum: Option<&str>) -> FrontMatter {
        FrontMatter {
            title: Some(self.title.clone()),
            tags: self.tags.clone(),
            cover_image: self.cover_image.clone(),
            extra: self.extra.clone(),
            checksum: checksum.map(String::from),
        }
    }

    /// The full document as sent to dev.to, with the fingerprint embedded.
    pub fn to_document(&self) -> Result<String, serde_yaml::Error> {
        render_document(&self.front_matter(Some(&self.fingerprint)), &self.body)
    }
}

pub fn render_document(front_matter: &FrontMatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

/// Splits `---` delimited front matter from the body.
///
/// Returns `None` when the document has no front matter block.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---\n")?;

    let mut candidates = Vec::new();
    if rest.starts_with("---") {
        candidates.push(0);
    }
    candidates.extend(rest.match_indices("\n---").map(|(i, _)| i + 1));

    for start in candidates {
        let after = &rest[start + 3..];
        let body = if after.is_empty() {
            Some(after)
        } else {
            after.strip_prefix('\n')
        };
        if let Some(body) = body {
            return Some((&rest[..start], body.trim_start_matches('\n')));
        }
    }
    None
}

/// An article as listed by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteArticle {
    pub id: u64,
    pub title: String,
    #[serde(rename = "body_markdown", default)]
    pub raw_body: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl RemoteArticle {
    /// The `checksum` stored in the remote front matter, if any.
    pub fn checksum(&self) -> Option<String> {
        let (yaml, _) = split_front_matter(&self.raw_body)?;
        let mapping: Mapping = serde_yaml::from_str(yaml).ok()?;
        match mapping.get("checksum")? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Response to a create or update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Published {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: String,
}
