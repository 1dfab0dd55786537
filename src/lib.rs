//! # Camera Preview
//!
//! Leak-free lifecycle control for a live camera preview.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              HOST UI                                 │
//! │   start/stop toggle ──► set_desired(Active | Inactive)               │
//! │   unmount          ──► destroy() / drop                              │
//! │   capture button   ──► request_capture()                             │
//! └───────────────────────────────┬──────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │              StreamController (preview::controller)                  │
//! │                                                                      │
//! │   Idle ──activate──► Acquiring(token) ──ok, token current──► Bound   │
//! │    ▲                     │   │                               │       │
//! │    │                     │   └──err, token current──► Failed │       │
//! │    └─────deactivate──────┴────────────────────────────────────┘       │
//! │                                                                      │
//! │   stale completions: handle released on arrival, errors dropped      │
//! └───────────────┬───────────────────────────────────┬──────────────────┘
//!                 │ acquire / release                 │ on_state_changed
//!                 ▼                                   ▼
//! ┌───────────────────────────────┐   ┌──────────────────────────────────┐
//! │   MediaSource (media)         │   │  PreviewBinding (preview)        │
//! │   ┌───────────┐ ┌──────────┐  │   │  bind/unbind ──► RenderSink      │
//! │   │ Simulated │ │  V4L2    │  │   │  status text, face guide,        │
//! │   └───────────┘ └──────────┘  │   │  capture callback                │
//! └───────────────────────────────┘   └──────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod media;
pub mod preview;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Ideal preview frame width
    pub const PREVIEW_WIDTH: u32 = 640;

    /// Ideal preview frame height
    pub const PREVIEW_HEIGHT: u32 = 480;

    /// Default latency of the simulated camera in milliseconds
    pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 300;

    /// Default log filter
    pub const DEFAULT_LOG_LEVEL: &str = "info";

    /// Config file name inside the platform config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}
