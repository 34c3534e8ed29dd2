mod api;
mod config;
mod error;
mod metrics;
mod payload;
mod server;
mod store;

use tracing_subscriber::EnvFilter;

const BANNER: &str = r#"
  ╔══════════════════════════════════════════════════╗
  ║                  T O D O D  v1.0                 ║
  ║          In-memory todo REST service             ║
  ║                    [ Rust ]                      ║
  ╚══════════════════════════════════════════════════╝
"#;

#[tokio::main]
async fn main() {
    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    };

    // Set up tracing with the configured log level
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    eprintln!("{BANNER}");

    if let Err(e) = server::run(config).await {
        eprintln!("fatal: {e}");
        std::process::exit(1);
    }
}
