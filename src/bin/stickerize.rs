//! Sticker CLI Tool
//!
//! Command-line interface for turning photos into bordered stickers with the
//! stickerize library.

#[cfg(feature = "cli")]
use stickerize::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
