// ABOUTME: Decides whether each article is created, updated, or skipped
// ABOUTME: Rehosts local images only when a remote write is going to happen

use crate::api::ArticleStore;
use crate::error::RemoteError;
use crate::images::ImageHost;
use crate::model::{Article, RemoteArticle};
use crate::sync::SyncOutcome;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)([^)]*)\)").expect("valid image regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Create,
    Update { id: u64 },
    Skip,
}

/// Compares the local fingerprint with the checksum stored remotely.
///
/// A remote article without a checksum was not published by this tool and
/// is always updated.
pub fn decide(article: &Article, remote: Option<&RemoteArticle>) -> SyncAction {
    let Some(remote) = remote else {
        return SyncAction::Create;
    };

    let remote_checksum = remote.checksum().unwrap_or_else(|| {
        warn!(
            title = %remote.title,
            "remote article has no checksum, it is likely not managed by devto-sync"
        );
        String::new()
    });

    if remote_checksum == article.fingerprint {
        SyncAction::Skip
    } else {
        SyncAction::Update { id: remote.id }
    }
}

/// Caches uploads so an image referenced twice is uploaded once.
pub struct ImageRehoster<'a> {
    host: &'a dyn ImageHost,
    uploaded: HashMap<PathBuf, String>,
}

impl<'a> ImageRehoster<'a> {
    pub fn new(host: &'a dyn ImageHost) -> Self {
        ImageRehoster {
            host,
            uploaded: HashMap::new(),
        }
    }

    /// Uploads `reference` if it names an existing local file.
    ///
    /// Returns `None` for references that are already remote or missing.
    fn rehost(&mut self, reference: &str, base_dir: &Path) -> Result<Option<String>, RemoteError> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(None);
        }

        let local = base_dir.join(reference);
        if !local.is_file() {
            debug!(path = %local.display(), "image not found locally, leaving reference as-is");
            return Ok(None);
        }

        if let Some(url) = self.uploaded.get(&local) {
            return Ok(Some(url.clone()));
        }

        let url = self.host.upload(&local)?;
        info!(path = %local.display(), url = %url, "uploaded image");
        self.uploaded.insert(local, url.clone());
        Ok(Some(url))
    }

    /// Rewrites `![desc](path)` references that point at local files to hosted URLs.
    pub fn upload_local_images(&mut self, body: &str, base_dir: &Path) -> Result<String, RemoteError> {
        let mut out = String::with_capacity(body.len());
        let mut last = 0;

        for caps in IMAGE_RE.captures_iter(body) {
            let Some(target) = caps.get(2) else {
                continue;
            };
            if let Some(url) = self.rehost(target.as_str(), base_dir)? {
                out.push_str(&body[last..target.start()]);
                out.push_str(&url);
                last = target.end();
            }
        }

        out.push_str(&body[last..]);
        Ok(out)
    }

    /// Uploads the article's cover image and points `cover_image` at the hosted copy.
    pub fn upload_cover_image(&mut self, article: &mut Article) -> Result<(), RemoteError> {
        let Some(cover) = article.cover_image.clone() else {
            return Ok(());
        };
        let base_dir = article.source_dir().to_path_buf();
        if let Some(url) = self.rehost(&cover, &base_dir)? {
            article.cover_image = Some(url);
        }
        Ok(())
    }

    pub fn rehost_article(&mut self, article: &mut Article) -> Result<(), RemoteError> {
        self.upload_cover_image(article)?;
        let base_dir = article.source_dir().to_path_buf();
        article.body = self.upload_local_images(&article.body, &base_dir)?;
        Ok(())
    }
}

/// Applies the sync decision for one article against the remote store.
pub struct Planner<'a> {
    store: &'a dyn ArticleStore,
    images: Option<&'a dyn ImageHost>,
}

impl<'a> Planner<'a> {
    pub fn new(store: &'a dyn ArticleStore, images: Option<&'a dyn ImageHost>) -> Self {
        Planner { store, images }
    }

    /// Decides and performs the write. The fingerprint is left untouched by
    /// rehosting, so the stored checksum always reflects the source content.
    pub fn sync(
        &self,
        article: &mut Article,
        remote: Option<&RemoteArticle>,
    ) -> Result<SyncOutcome, RemoteError> {
        let action = decide(article, remote);

        if action == SyncAction::Skip {
            info!(title = %article.title, "unchanged, skipping");
            return Ok(SyncOutcome::Skipped);
        }

        // a failed upload must not leave the article half rehosted
        if let Some(host) = self.images {
            let mut rehosted = article.clone();
            ImageRehoster::new(host).rehost_article(&mut rehosted)?;
            *article = rehosted;
        }

        match action {
            SyncAction::Create => {
                info!(title = %article.title, "creating article");
                let published = self.store.create(article)?;
                info!(title = %article.title, url = %published.url, "created article");
                Ok(SyncOutcome::Created { url: published.url })
            }
            SyncAction::Update { id } => {
                info!(title = %article.title, id, "updating article");
                let published = self.store.update(id, article)?;
                info!(title = %article.title, url = %published.url, "updated article");
                Ok(SyncOutcome::Updated { url: published.url })
            }
            SyncAction::Skip => Ok(SyncOutcome::Skipped),
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::model::Published;
    use std::cell::RefCell;

    /// In-memory store recording every write.
    #[derive(Default)]
    pub struct FakeStore {
        pub remote: Vec<RemoteArticle>,
        pub created: RefCell<Vec<Article>>,
        pub updated: RefCell<Vec<(u64, Article)>>,
        pub fail_titles: Vec<String>,
        pub fail_listing: bool,
    }

    impl ArticleStore for FakeStore {
        fn list_all(&self) -> Result<Vec<RemoteArticle>, RemoteError> {
            if self.fail_listing {
                return Err(RemoteError::Auth("bad key".into()));
            }
            Ok(self.remote.clone())
        }

        fn create(&self, article: &Article) -> Result<Published, RemoteError> {
            if self.fail_titles.contains(&article.title) {
                return Err(RemoteError::Server {
                    status: 500,
                    message: "boom".into(),
                });
            }
            self.created.borrow_mut().push(article.clone());
            Ok(Published {
                id: Some(100 + self.created.borrow().len() as u64),
                url: format!("https://dev.to/me/{}", article.title.replace(' ', "-")),
            })
        }

        fn update(&self, id: u64, article: &Article) -> Result<Published, RemoteError> {
            if self.fail_titles.contains(&article.title) {
                return Err(RemoteError::BadRequest("nope".into()));
            }
            self.updated.borrow_mut().push((id, article.clone()));
            Ok(Published {
                id: Some(id),
                url: format!("https://dev.to/me/{}", id),
            })
        }
    }

    /// Image host that hands out sequential URLs.
    #[derive(Default)]
    pub struct FakeImageHost {
        pub uploads: RefCell<Vec<PathBuf>>,
        /// File names whose upload is rejected.
        pub fail_files: Vec<String>,
    }

    impl ImageHost for FakeImageHost {
        fn upload(&self, path: &Path) -> Result<String, RemoteError> {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            if name.is_some_and(|n| self.fail_files.contains(&n)) {
                return Err(RemoteError::BadRequest("image rejected".into()));
            }
            let mut uploads = self.uploads.borrow_mut();
            uploads.push(path.to_path_buf());
            Ok(format!("https://i.imgur.com/{}.png", uploads.len()))
        }
    }
}
