// ABOUTME: Public library API for publishing markdown articles to dev.to
// ABOUTME: Re-exports the loader, planner, and batch sync entry points

pub mod api;
pub mod cli;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod images;
pub mod loader;
pub mod logging;
pub mod model;
pub mod planner;
pub mod storage;
pub mod sync;
pub mod throttle;
pub mod transform;

pub use error::{Error, LoadError, RemoteError, Result};
pub use model::{Article, FrontMatter, Published, RemoteArticle};
pub use sync::{sync_all, SyncOptions, SyncOutcome, SyncReport};
