mod app;
mod commands;
mod config;
mod logging;
mod playback;
mod preview;
mod recording;
mod records;
mod store;
mod ui;
mod wiring;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
