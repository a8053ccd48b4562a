//! Paintbox Application
//!
//! Session shell around the canvas: commands, pointer and keyboard routing,
//! background loading, exports and scripted replay.

pub mod cli;
mod commands;
mod config;
mod error;
mod script;
mod session;
mod shortcuts;
mod sink;

pub use commands::{Command, CommandSender};
pub use config::{AppConfig, CONFIG_ENV};
pub use error::{AppError, AppResult};
pub use script::{Script, ScriptReport, ScriptStep, run_script};
pub use session::{BackgroundLoad, PaintSession};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
