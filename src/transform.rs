// ABOUTME: Pure markdown rewriting rules applied to article bodies before publishing
// ABOUTME: Newline collapsing, link prefixing, youtube embeds, code imports, admonitions

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Block prefixes that are never collapsed.
const EXEMPT_PREFIXES: &[&str] = &["```", "---", "-", "*", "![", ":::"];

/// Prefixes that open a fence which may span several blank-line separated blocks.
const FENCE_MARKERS: &[&str] = &["```", "---", ":::"];

static LOCAL_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\((/(?:[^/)\s][^)\s]*)?)([^)]*)\)").expect("valid local link regex"));
static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A(\s*)`youtube:\s*([^`]+?)\s*`").expect("valid youtube regex")
});
static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```([^\n]*)\n(.*?)^```[ \t]*$").expect("valid code block regex")
});
static FILE_ANNOTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*file=(\S+)").expect("valid file annotation regex"));
static TITLE_ANNOTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":title=\S*").expect("valid title annotation regex"));
static ADMONITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^:::[^\n]*\n(.*?)^:::[ \t]*$").expect("valid admonition regex")
});

/// Inputs the body rules need beyond the text itself.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Base URL prefixed onto site-relative links.
    pub site: Option<&'a str>,
    /// Directory code imports resolve against.
    pub base_dir: &'a Path,
}

/// Runs every body rule in order.
///
/// Collapsing runs first so the regex rules see joined paragraph text; the
/// fenced constructs they look for are exempt from collapsing.
pub fn apply(body: &str, ctx: &TransformContext<'_>) -> String {
    let body = collapse_newlines(body);
    let body = rewrite_local_links(&body, ctx.site);
    let body = convert_youtube(&body);
    let body = resolve_code_imports(&body, ctx.base_dir);
    convert_admonitions(&body)
}

/// Joins single newlines inside plain paragraphs.
///
/// Blocks are separated by blank lines. A block starting with one of the
/// exempt prefixes is left alone; a fence marker that is not closed in the
/// same block keeps every following block exempt until one ends with it.
pub fn collapse_newlines(body: &str) -> String {
    let mut open_fence: Option<&str> = None;
    let mut blocks = Vec::new();

    for block in body.split("\n\n") {
        // runs of three or more newlines leave the extras on the next block
        let content = block.trim_start_matches('\n');

        if let Some(fence) = open_fence {
            if content.trim_end().ends_with(fence) {
                open_fence = None;
            }
            blocks.push(block.to_string());
            continue;
        }

        if let Some(prefix) = EXEMPT_PREFIXES.iter().find(|p| content.starts_with(**p)) {
            if FENCE_MARKERS.contains(prefix) && !closes_own_fence(content, prefix) {
                open_fence = Some(*prefix);
            }
            blocks.push(block.to_string());
            continue;
        }

        blocks.push(join_paragraph_lines(block));
    }

    blocks.join("\n\n")
}

/// Joins interior newlines only; leading and trailing newlines are layout.
fn join_paragraph_lines(block: &str) -> String {
    let text = block.trim_matches('\n');
    if text.is_empty() {
        return block.to_string();
    }
    let lead = block.len() - block.trim_start_matches('\n').len();
    let trail = block.len() - block.trim_end_matches('\n').len();
    format!(
        "{}{}{}",
        &block[..lead],
        text.replace('\n', " "),
        &block[block.len() - trail..]
    )
}

fn closes_own_fence(block: &str, marker: &str) -> bool {
    let trimmed = block.trim_end();
    // a lone `---` is a horizontal rule, a lone ``` or ::: opens a fence
    if trimmed == marker {
        return marker == "---";
    }
    trimmed.len() > marker.len() && trimmed.ends_with(marker)
}

/// Strips hyphens and lowercases each tag, dropping duplicates after normalization.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.replace('-', "").to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Prefixes site-relative link targets (`](/path)`) with `site`.
pub fn rewrite_local_links(body: &str, site: Option<&str>) -> String {
    let Some(site) = site else {
        return body.to_string();
    };
    let site = site.trim_end_matches('/');

    LOCAL_LINK_RE
        .replace_all(body, |caps: &Captures| {
            format!("]({}{}{})", site, &caps[1], &caps[2])
        })
        .into_owned()
}

/// Converts a leading `` `youtube: <id>` `` directive into a liquid embed tag.
pub fn convert_youtube(body: &str) -> String {
    YOUTUBE_RE
        .replacen(body, 1, |caps: &Captures| {
            let id = caps[2].replace([':', '`'], "");
            format!("{}{{% youtube {} %}}", &caps[1], id.trim())
        })
        .into_owned()
}

/// Splices the contents of `file=<path>` annotated code blocks into the block.
///
/// An unreadable file leaves the block in place with only its `:title=`
/// annotation removed.
pub fn resolve_code_imports(body: &str, base_dir: &Path) -> String {
    CODE_BLOCK_RE
        .replace_all(body, |caps: &Captures| {
            let info = &caps[1];
            let original = caps[0].to_string();

            if !FILE_ANNOTATION_RE.is_match(info) {
                return original;
            }

            let info = TITLE_ANNOTATION_RE.replace_all(info, "").into_owned();
            let Some(file_caps) = FILE_ANNOTATION_RE.captures(&info) else {
                return original;
            };
            let import_path = base_dir.join(&file_caps[1]);

            match fs::read_to_string(&import_path) {
                Ok(contents) => {
                    debug!(path = %import_path.display(), "imported code block");
                    let info = FILE_ANNOTATION_RE.replace_all(&info, "");
                    let newline = if contents.ends_with('\n') { "" } else { "\n" };
                    format!("```{}\n{}{}```", info.trim(), contents, newline)
                }
                Err(e) => {
                    warn!(path = %import_path.display(), error = %e, "could not import code block file");
                    format!("```{}\n{}```", info, &caps[2])
                }
            }
        })
        .into_owned()
}

/// Turns `:::` admonitions into a single blockquote line.
pub fn convert_admonitions(body: &str) -> String {
    ADMONITION_RE
        .replace_all(body, |caps: &Captures| {
            let text = caps[1]
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            format!("> {}", text)
        })
        .into_owned()
}
