// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration, set up logging and hand over
//   to the UI loop.
// - Returns `anyhow::Result` so startup failures print with context.

use catbox_cli::{ui::main_menu, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catbox_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Endpoints and user hash come from CATBOX_* / LITTERBOX_* variables.
    // See `config::Config::from_env`.
    let config = Config::from_env();

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(config)?;
    Ok(())
}
