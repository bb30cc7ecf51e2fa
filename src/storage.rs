// ABOUTME: Output sink that persists final article documents to disk
// ABOUTME: Writes atomically via a temp file in the destination directory

use crate::model::Article;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File name for an article: its title with spaces and separators turned into hyphens.
pub fn output_file_name(title: &str) -> String {
    format!("{}.md", title.trim().replace([' ', '/', '\\'], "-"))
}

/// Writes the article's full document into `dir`, returning the written path.
pub fn save_article(dir: &Path, article: &Article) -> Result<PathBuf> {
    let path = dir.join(output_file_name(&article.title));
    let document = article.to_document()?;
    write_atomic(&path, document.as_bytes())?;
    Ok(path)
}

pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use rand::Rng;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let random: u32 = rand::thread_rng().gen();
    let tmp_path = parent.join(format!(".{:x}.part", random));

    fs::write(&tmp_path, content)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
