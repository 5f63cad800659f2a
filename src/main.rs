/*
 * Responsibility
 * - tokio runtime entry
 * - Dispatch to app::run() or app::create_user() (no logic here)
 */
use anyhow::Result;

use minimarket::app;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "create-user" => app::create_user(rest).await,
        _ => app::run().await,
    }
}
