use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use vmadmin_rs::cli::{self, Cli};
use vmadmin_rs::config::Config;
use vmadmin_rs::store::VmailStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = if std::path::Path::new("vmadmin.toml").exists() {
        match Config::from_file("vmadmin.toml") {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Initialize logging
    let level = config.logging.level.parse().unwrap_or(Level::WARN);
    let builder = FmtSubscriber::builder().with_max_level(level);
    let result = if config.logging.format == "pretty" {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish())
    };
    result.expect("Failed to set tracing subscriber");

    let database_url = cli.db.unwrap_or(config.storage.database_url);

    let store = match VmailStore::connect(&database_url).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut out = std::io::stdout();
    if let Err(e) = cli::run(cli.command, &store, &mut out).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
