// ABOUTME: CLI entrypoint for the devto-sync command
// ABOUTME: Wires credentials, discovery, and clients into one sync run

use clap::Parser;
use devto_sync::{
    api::DevtoClient,
    cli::Cli,
    credentials::{resolve_api_key, resolve_imgur_client_id},
    discovery::discover,
    images::{ImageHost, ImgurClient},
    logging, sync_all, Result, SyncOptions,
};
use tracing::info;

fn main() {
    if let Err(e) = run() {
        eprintln!("devto-sync: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_filter())?;

    let target = cli.target()?;
    let api_key = resolve_api_key(cli.devto_api_key.clone())?;
    let files = discover(&target, &cli.ignore)?;
    info!(count = files.len(), "found markdown files");

    let store = DevtoClient::new(api_key, Some(cli.api_base.clone()))?;
    let imgur = match resolve_imgur_client_id(cli.imgur_client_id.clone()) {
        Some(id) => Some(ImgurClient::new(id, Some(cli.image_host_base.clone()))?),
        None => {
            info!("no Imgur client id, local images will not be uploaded");
            None
        }
    };
    let images = imgur.as_ref().map(|c| c as &dyn ImageHost);

    let options = SyncOptions {
        site: cli.site.clone(),
        output_dir: cli.output.clone(),
        ..SyncOptions::default()
    };
    let report = sync_all(&store, images, &files, &options)?;

    println!(
        "synced {} articles ({} created, {} updated, {} skipped, {} failed)",
        report.articles.len(),
        report.created(),
        report.updated(),
        report.skipped(),
        report.failed()
    );

    Ok(())
}
