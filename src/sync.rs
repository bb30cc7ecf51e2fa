// ABOUTME: Batch orchestration of loading, planning, and publishing articles
// ABOUTME: Records one outcome per file; only the upfront remote listing is fatal

use crate::{
    api::ArticleStore,
    error::{LoadError, RemoteError},
    images::ImageHost,
    loader::load_article,
    model::RemoteArticle,
    planner::Planner,
    storage::save_article,
    throttle::{RateLimiter, RateWindow},
    Result,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span};

#[derive(Debug)]
pub enum Failure {
    Load(LoadError),
    Remote(RemoteError),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Load(e) => write!(f, "{}", e),
            Failure::Remote(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    Created { url: String },
    Updated { url: String },
    Skipped,
    Failed(Failure),
}

impl SyncOutcome {
    /// Whether a write against the remote quota was attempted.
    fn attempted_write(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Created { .. }
                | SyncOutcome::Updated { .. }
                | SyncOutcome::Failed(Failure::Remote(_))
        )
    }
}

#[derive(Debug)]
pub struct ArticleReport {
    pub path: PathBuf,
    pub title: Option<String>,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub articles: Vec<ArticleReport>,
}

impl SyncReport {
    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.articles.iter().filter(|a| pred(&a.outcome)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Updated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Failed(_)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Base URL for rewriting site-relative links.
    pub site: Option<String>,
    /// Where final documents are saved, if anywhere.
    pub output_dir: Option<PathBuf>,
    pub limiter: RateLimiter,
}

/// Publishes every file in `files`, in order.
///
/// Fails only if the remote article listing cannot be fetched; every other
/// problem is recorded against the article it happened to.
pub fn sync_all(
    store: &dyn ArticleStore,
    images: Option<&dyn ImageHost>,
    files: &[PathBuf],
    options: &SyncOptions,
) -> Result<SyncReport> {
    info!("Fetching remote article list...");
    let remote = store.list_all()?;
    let by_title: HashMap<&str, &RemoteArticle> =
        remote.iter().map(|a| (a.title.as_str(), a)).collect();
    info!(count = remote.len(), "fetched remote articles");

    let planner = Planner::new(store, images);
    let mut window = RateWindow::start();
    let mut report = SyncReport::default();

    for path in files {
        let span = info_span!("article", path = %path.display());
        let _enter = span.enter();

        let entry = sync_one(&planner, &by_title, path, options);
        if entry.outcome.attempted_write() {
            window.uploaded += 1;
        }
        window = options.limiter.admit(window);
        report.articles.push(entry);
    }

    info!(
        total = report.articles.len(),
        created = report.created(),
        updated = report.updated(),
        skipped = report.skipped(),
        failed = report.failed(),
        "sync finished"
    );

    Ok(report)
}

fn sync_one(
    planner: &Planner<'_>,
    by_title: &HashMap<&str, &RemoteArticle>,
    path: &Path,
    options: &SyncOptions,
) -> ArticleReport {
    let mut article = match load_article(path, options.site.as_deref()) {
        Ok(article) => article,
        Err(e) => {
            error!(error = %e, "failed to load article");
            return ArticleReport {
                path: path.to_path_buf(),
                title: None,
                outcome: SyncOutcome::Failed(Failure::Load(e)),
            };
        }
    };

    let remote = by_title.get(article.title.as_str()).copied();
    let outcome = match planner.sync(&mut article, remote) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(title = %article.title, error = %e, "failed to publish article");
            SyncOutcome::Failed(Failure::Remote(e))
        }
    };

    if let Some(dir) = &options.output_dir {
        match save_article(dir, &article) {
            Ok(saved) => debug!(path = %saved.display(), "saved article"),
            Err(e) => error!(title = %article.title, error = %e, "failed to save article"),
        }
    }

    ArticleReport {
        path: path.to_path_buf(),
        title: Some(article.title),
        outcome,
    }
}
