//! TTS runner entry point
//!
//! Startup order matters: configuration first (logging settings live there),
//! then the logger, then the engine, then the web server. Any failure along
//! the way is fatal and exits with code 1.

use log::{debug, error, info, LevelFilter};
use std::process;
use std::sync::Arc;
use tts_runner::config::Config;
use tts_runner::engine::{create_engine, TtsEngine};
use tts_runner::server::run_server;
use tts_runner::Result;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    init_logger(&config);
    info!(
        "Starting {} {}: server={}:{}, sharing={}, open_browser={}",
        tts_runner::APP_NAME,
        tts_runner::VERSION,
        config.bind_host(),
        config.server_port,
        config.enable_sharing,
        config.open_browser
    );

    if let Err(e) = run(config).await {
        error!("Failed to start application: {}", e);
        process::exit(1);
    }
}

/// Initialize env_logger from config
///
/// DEBUG=true forces debug-level logging; LOG_FILE pipes output to a file
/// instead of stderr.
fn init_logger(config: &Config) {
    let level = if config.debug {
        LevelFilter::Debug
    } else {
        config
            .log_level
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::Info)
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let Some(log_file) = &config.log_file {
        use std::fs::OpenOptions;
        match OpenOptions::new().create(true).append(true).open(log_file) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "Warning: Failed to open {} for logging: {}",
                    log_file.display(),
                    e
                );
                eprintln!("Continuing with stderr logging...");
            }
        }
    }

    builder.init();

    if let Some(log_file) = &config.log_file {
        info!("Logging to file: {}", log_file.display());
    }
}

async fn run(config: Config) -> Result<()> {
    config.ensure_dirs()?;
    debug!(
        "Directories ready: output={:?}, models={:?}",
        config.output_dir, config.models_cache_dir
    );

    let engine: Arc<dyn TtsEngine> = Arc::from(create_engine(&config)?);
    info!("Speech engine initialized: {}", engine.name());

    let config = Arc::new(config);
    if config.open_browser {
        open_browser_later(format!(
            "http://{}:{}",
            display_host(config.bind_host()),
            config.server_port
        ));
    }

    run_server(config, engine).await
}

/// 0.0.0.0 is a bind address, not a URL a browser can open
fn display_host(bind_host: &str) -> &str {
    if bind_host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        bind_host
    }
}

/// Best-effort: open the UI once the server has had a moment to bind
fn open_browser_later(url: String) {
    std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(500));
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        match std::process::Command::new(opener).arg(&url).status() {
            Ok(status) if status.success() => debug!("Opened browser at {}", url),
            Ok(_) | Err(_) => info!("Open {} in your browser", url),
        }
    });
}
