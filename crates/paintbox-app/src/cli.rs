//! Command line entry for the `paintbox` binary.

use crate::config::{AppConfig, CONFIG_ENV};
use crate::error::AppResult;
use crate::script::{Script, ScriptReport, run_script};
use crate::session::PaintSession;
use crate::shortcuts::ShortcutRegistry;
use crate::sink::DirectorySink;
use clap::Parser;
use paintbox_render::FileImageSource;
use std::path::PathBuf;
use std::rc::Rc;

/// Replay a painting script and write its exports.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "paintbox", version)]
pub struct CliArgs {
    /// Script of commands and pointer events (JSON).
    #[arg(required_unless_present = "shortcuts")]
    pub script: Option<PathBuf>,

    /// Config file (JSON).
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Print the keyboard shortcuts.
    #[arg(long, default_value_t = false)]
    pub shortcuts: bool,
}

/// Build a session from the config, replay the script and write exports to
/// the configured output directory.
pub fn run(args: &CliArgs) -> AppResult<Option<ScriptReport>> {
    if args.shortcuts {
        ShortcutRegistry::print_all();
    }
    let Some(script_path) = args.script.as_deref() else {
        return Ok(None);
    };

    let config = AppConfig::load(args.config.as_deref())?;
    let script = Script::from_json_file(script_path)?;

    let sink = DirectorySink::new(config.output_dir.clone());
    let mut session = PaintSession::new(&config, Rc::new(FileImageSource::new()), Box::new(sink));
    if let Some(path) = config.watermark.as_deref() {
        match std::fs::read(path) {
            Ok(bytes) => {
                session.load_watermark(&bytes);
            }
            Err(e) => log::warn!("Watermark {} unavailable: {e}", path.display()),
        }
    }
    session.store_mut().subscribe(|event| {
        if let paintbox_core::StoreEvent::HistoryChanged(status) = event {
            log::debug!(
                "History {:?}/{} (undo: {}, redo: {})",
                status.index,
                status.len,
                status.can_undo(),
                status.can_redo()
            );
        }
    });

    let report = run_script(&mut session, &script);
    log::info!(
        "Replayed {} steps, {} background(s) applied",
        report.steps,
        report.backgrounds_applied
    );
    Ok(Some(report))
}
