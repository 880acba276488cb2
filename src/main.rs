use clap::Parser;
use tracing_subscriber::EnvFilter;
use tumblelog::build::build_site;
use tumblelog::config::{Config, Options};

fn main() {
    if let Err(e) = run(Options::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    let config = Config::from_options(options)?;

    // Progress is logged at INFO; --quiet keeps only warnings. RUST_LOG wins.
    let default_filter = match config.quiet {
        true => "warn",
        false => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .without_time()
        .init();

    build_site(&config)?;
    Ok(())
}
