use anyhow::Result;
use clap::Parser;

use aicompanion::cli::{self, Args};
use aicompanion::config::Config;
use aicompanion::logging::{self, DEFAULT_CONSOLE_LEVEL};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::new(args.data_dir.clone())?;

    let console_level = args.log_level.as_deref().unwrap_or(DEFAULT_CONSOLE_LEVEL);
    let _guard = logging::init_logging(console_level, &config.log_level, Some(&config.log_dir()))?;

    cli::run(args, config).await
}
