use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use engine::{Disposition, Engine, HttpEmitter};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Notify,
};
use tracing::{debug, info, warn};

mod chat;
mod config;

use chat::parse_line;
use config::{load_settings, DEFAULT_CONFIG_PATH};

/// Runs the high-low game for chat messages read from stdin, one
/// `name<TAB>text` line per message.
#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the render mirror.
    #[arg(long)]
    mirror_url: Option<String>,
    /// Chat identity allowed to shut the game down.
    #[arg(long)]
    admin: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(url) = args.mirror_url {
        settings.mirror_url = url;
    }
    if let Some(admin) = args.admin {
        settings.admin = Some(admin);
    }

    let mirror_url = settings.mirror_url()?;
    let emitter = Arc::new(HttpEmitter::new(
        mirror_url.clone(),
        settings.request_timeout(),
    )?);
    let engine = Engine::new(settings.engine_config(), emitter.clone());
    let shutdown = Arc::new(Notify::new());
    info!(%mirror_url, admin = ?settings.admin, "chatbot ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    let Some(message) = parse_line(&line) else {
                        debug!(%line, "unparseable chat line skipped");
                        continue;
                    };
                    let display_name = message.display_name.to_string();
                    let text = message.text.to_string();
                    let engine = Arc::clone(&engine);
                    let shutdown = Arc::clone(&shutdown);
                    tokio::spawn(async move {
                        if engine.handle_message(&display_name, &text).await == Disposition::Shutdown {
                            shutdown.notify_one();
                        }
                    });
                }
                None => {
                    info!("chat input closed; running games continue until interrupted");
                    input_open = false;
                }
            },
            _ = shutdown.notified() => break,
            result = tokio::signal::ctrl_c() => {
                if let Err(error) = result {
                    warn!(%error, "failed to listen for interrupt");
                }
                info!("interrupt received");
                return Ok(());
            }
        }
    }

    if let Err(error) = emitter.request_shutdown().await {
        warn!(%error, "mirror did not acknowledge shutdown");
    }
    info!("chatbot stopped");
    Ok(())
}
