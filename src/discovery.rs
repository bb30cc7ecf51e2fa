// ABOUTME: Finds the markdown files a sync run should publish
// ABOUTME: Accepts one file or walks a folder, honouring ignore substrings

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Folder(PathBuf),
}

pub fn discover(target: &Target, ignore: &[String]) -> Result<Vec<PathBuf>> {
    match target {
        Target::File(path) => {
            if !path.is_file() {
                return Err(Error::Input(format!("{} is not a file", path.display())));
            }
            Ok(vec![path.clone()])
        }
        Target::Folder(root) => {
            if !root.is_dir() {
                return Err(Error::Input(format!("{} is not a directory", root.display())));
            }
            let mut files = Vec::new();
            walk(root, &mut files)?;
            files.retain(|path| !is_ignored(path, ignore));
            files.sort();
            Ok(files)
        }
    }
}

/// Collects `.md` files under `dir`. Symlinked directories are not followed,
/// and subdirectories that cannot be read are logged and skipped.
fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if let Err(e) = walk(&path, files) {
                warn!(path = %path.display(), error = %e, "skipping unreadable directory");
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("md")
            && (file_type.is_file() || path.is_file())
        {
            files.push(path);
        }
    }
    Ok(())
}

/// A file is ignored when any pattern occurs in the path of its directory.
fn is_ignored(path: &Path, ignore: &[String]) -> bool {
    let parent = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    ignore.iter().any(|pattern| parent.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn test_discover_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("post.md");
        file.write_str("---\ntitle: x\n---\n").unwrap();

        let found = discover(&Target::File(file.path().to_path_buf()), &[]).unwrap();
        assert_eq!(found, vec![file.path().to_path_buf()]);
    }

    #[test]
    fn test_discover_missing_file_is_input_error() {
        let temp = TempDir::new().unwrap();
        let err = discover(&Target::File(temp.path().join("nope.md")), &[]).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn test_discover_folder_recursive_sorted() {
        let temp = TempDir::new().unwrap();
        temp.child("b.md").touch().unwrap();
        temp.child("a.md").touch().unwrap();
        temp.child("notes.txt").touch().unwrap();
        temp.child("nested/c.md").touch().unwrap();

        let found = discover(&Target::Folder(temp.path().to_path_buf()), &[]).unwrap();
        assert_eq!(
            found,
            vec![
                temp.path().join("a.md"),
                temp.path().join("b.md"),
                temp.path().join("nested/c.md"),
            ]
        );
    }

    #[test]
    fn test_discover_ignores_by_directory_substring() {
        let temp = TempDir::new().unwrap();
        temp.child("keep/post.md").touch().unwrap();
        temp.child("drafts/wip.md").touch().unwrap();
        temp.child("drafts-old/older.md").touch().unwrap();
        temp.child("drafts.md").touch().unwrap();

        let found = discover(
            &Target::Folder(temp.path().to_path_buf()),
            &["drafts".to_string()],
        )
        .unwrap();

        assert_eq!(
            found,
            vec![temp.path().join("drafts.md"), temp.path().join("keep/post.md")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_does_not_follow_directory_symlink_loop() {
        let temp = TempDir::new().unwrap();
        temp.child("posts/a.md").touch().unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("posts/loop")).unwrap();

        let found = discover(&Target::Folder(temp.path().to_path_buf()), &[]).unwrap();
        assert_eq!(found, vec![temp.path().join("posts/a.md")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        temp.child("open/a.md").touch().unwrap();
        temp.child("locked/b.md").touch().unwrap();
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = discover(&Target::Folder(temp.path().to_path_buf()), &[]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let found = result.unwrap();
        assert!(found.contains(&temp.path().join("open/a.md")));
    }
}
