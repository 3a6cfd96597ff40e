use anyhow::Context as _;
use clap::Parser;
use graphql_factory_starwars::config::load_config;
use graphql_factory_starwars::{AppState, build_schema, observability, server};

/// Serves the Star Wars schema over HTTP.
#[derive(Debug, Parser)]
#[command(name = "starwars-server", version)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long, env = "STARWARS_CONFIG", default_value = "starwars.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();
    let cli = Cli::parse();

    let cfg = match load_config(Some(&cli.config)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    tracing::info!(path = %cli.config, "Configuration loaded");
    observability::apply_logging_level(&cfg.logging.level);

    if let Err(err) = run(cfg).await {
        eprintln!("Server error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cfg: graphql_factory_starwars::config::AppConfig) -> anyhow::Result<()> {
    let addr = cfg.addr().map_err(anyhow::Error::msg)?;
    let schema = build_schema(cfg.graphql.limits.clone()).context("schema definition rejected")?;
    let state = AppState::new(schema, cfg.graphql.context_content.as_str())
        .with_graphiql(cfg.graphql.graphiql);
    server::serve(addr, state)
        .await
        .with_context(|| format!("failed to serve on {addr}"))
}
