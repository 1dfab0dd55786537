//! Camera Preview Console
//!
//! Drives a preview controller from stdin, standing in for the sign-in and
//! registration screens that embed the camera widget.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use camera_preview::{
    config::AppConfig,
    preview::{DesiredState, LogSink, PreviewBinding, StreamController},
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const HELP: &str = "commands: on | off | toggle | capture | status | help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Config path from args or the platform default
    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting camera preview console");
    tracing::debug!(path = %config_path.display(), "Configuration loaded");

    let source = config.source.build();
    tracing::info!(source = source.name(), "Camera source ready");

    let captured = Arc::new(AtomicU64::new(0));
    let capture_count = captured.clone();
    let binding = PreviewBinding::new(LogSink::new())
        .with_guidance(config.camera.show_guidance)
        .with_capture(move || {
            let n = capture_count.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("{} photo(s) captured", n);
        });

    let controller = StreamController::new(source, binding, config.camera.constraints.clone())?;

    // Echo status changes as they happen
    let mut status_rx = controller.subscribe();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = status_rx.borrow_and_update().clone();
            match status.error_text() {
                Some(text) => println!("[preview] {}", text),
                None => println!("[preview] {:?}", status),
            }
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "on" => controller.set_desired(DesiredState::Active),
            "off" => controller.set_desired(DesiredState::Inactive),
            "toggle" => controller.toggle(),
            "capture" => {
                if !controller.request_capture() {
                    println!("nothing to capture: camera is not live");
                }
            }
            "status" => {
                let status = serde_json::json!({
                    "desired": controller.desired(),
                    "preview": controller.status(),
                    "guide": controller.observe(|b| b.show_guidance()),
                    "showing": controller.observe(|b| b.bound_source()),
                    "binds": controller.observe(|b| b.sink().binds()),
                    "captured": captured.load(Ordering::SeqCst),
                    "pending": controller.pending_acquisitions(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            "help" => println!("{}", HELP),
            "quit" | "exit" => break,
            other => println!("unknown command '{}'; {}", other, HELP),
        }
    }

    controller.destroy();

    // Let in-flight acquisitions land so they can release themselves
    if tokio::time::timeout(SHUTDOWN_GRACE, controller.settled())
        .await
        .is_err()
    {
        tracing::warn!(
            pending = controller.pending_acquisitions(),
            "Camera acquisition still in flight at exit"
        );
    }

    tracing::info!(
        captured = captured.load(Ordering::SeqCst),
        "Camera preview console stopped"
    );
    Ok(())
}
