//! Scripted sessions: a JSON list of steps replayed against a session.

use crate::commands::Command;
use crate::error::{AppError, AppResult};
use crate::session::PaintSession;
use paintbox_core::{KeyPress, PointerEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Command(Command),
    Pointer(PointerEvent),
    Key(KeyPress),
    Resize { width: u32, height: u32 },
    /// Write the presented view (zoom and pan applied) as `<name>.png`.
    View {
        width: u32,
        height: u32,
        #[serde(default = "default_view_name")]
        name: String,
    },
    /// Wait for every background load started so far.
    AwaitBackground,
}

fn default_view_name() -> String {
    "view".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// What a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub steps: usize,
    pub backgrounds_applied: usize,
    pub views: usize,
}

/// Replay `script` against `session`. Commands go through the session's
/// command channel. Loads still pending at the end are awaited.
pub fn run_script(session: &mut PaintSession, script: &Script) -> ScriptReport {
    let sender = session.command_sender();
    let mut report = ScriptReport::default();

    for step in &script.steps {
        match step {
            ScriptStep::Command(command) => {
                sender.send(command.clone());
                session.process_commands();
            }
            ScriptStep::Pointer(event) => {
                session.handle_pointer(*event);
            }
            ScriptStep::Key(press) => {
                if !session.handle_key(press) {
                    log::debug!("No shortcut for {:?}", press.key);
                }
            }
            ScriptStep::Resize { width, height } => session.resize(*width, *height),
            ScriptStep::View { width, height, name } => match session.present(*width, *height, name) {
                Ok(true) => report.views += 1,
                Ok(false) => {}
                Err(e) => log::warn!("View {name} failed: {e}"),
            },
            ScriptStep::AwaitBackground => report.backgrounds_applied += session.await_background(),
        }
        report.steps += 1;
    }

    if session.has_pending_loads() {
        report.backgrounds_applied += session.await_background();
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::sink::MemorySink;
    use kurbo::Point;
    use paintbox_core::{MouseButton, ToolKind};
    use paintbox_render::{ExportKind, MemoryImageSource};
    use std::rc::Rc;

    const SCRIPT: &str = r##"{
        "steps": [
            {"command": {"set_tool": "brush"}},
            {"command": {"set_color": "#3366ff"}},
            {"pointer": {"type": "down", "position": {"x": 10.0, "y": 10.0}}},
            {"pointer": {"type": "move", "position": {"x": 40.0, "y": 30.0}}},
            {"pointer": {"type": "up", "position": {"x": 40.0, "y": 30.0}}},
            {"key": {"key": "z", "modifiers": {"ctrl": true}}},
            {"key": {"key": "z", "modifiers": {"ctrl": true, "shift": true}}},
            {"resize": {"width": 120, "height": 60}},
            "await_background",
            {"command": {"zoom_at": {"x": 0.0, "y": 0.0, "factor": 2.0}}},
            {"view": {"width": 80, "height": 40, "name": "zoomed"}},
            {"command": {"export": "image"}}
        ]
    }"##;

    fn session(sink: &MemorySink) -> PaintSession {
        let config = AppConfig {
            width: 100,
            height: 50,
            ..AppConfig::default()
        };
        PaintSession::new(&config, Rc::new(MemoryImageSource::new()), Box::new(sink.clone()))
    }

    #[test]
    fn test_parse_steps() {
        let script = Script::from_json_str(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 12);
        assert_eq!(script.steps[0], ScriptStep::Command(Command::SetTool(ToolKind::Brush)));
        assert_eq!(
            script.steps[2],
            ScriptStep::Pointer(PointerEvent::Down {
                position: Point::new(10.0, 10.0),
                button: MouseButton::Left,
            })
        );
        assert_eq!(script.steps[8], ScriptStep::AwaitBackground);
        assert_eq!(
            script.steps[10],
            ScriptStep::View {
                width: 80,
                height: 40,
                name: "zoomed".to_string(),
            }
        );
    }

    #[test]
    fn test_replay() {
        let sink = MemorySink::new();
        let mut session = session(&sink);
        let script = Script::from_json_str(SCRIPT).unwrap();

        let report = run_script(&mut session, &script);
        assert_eq!(report.steps, 12);
        assert_eq!(report.backgrounds_applied, 0);
        assert_eq!(report.views, 1);
        assert!((session.store().camera().zoom - 2.0).abs() < f64::EPSILON);
        assert_eq!(session.store().tool(), ToolKind::Brush);
        assert_eq!(session.surface().size(), (120, 60));

        let artifacts = sink.artifacts();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].file_name, "zoomed.png");
        assert_eq!(artifacts[1].kind, ExportKind::Image);
        assert!(artifacts[1].file_name.starts_with("painting-"));
    }

    #[test]
    fn test_invalid_script() {
        assert!(matches!(
            Script::from_json_str(r#"{"steps": [{"fly": true}]}"#),
            Err(AppError::Script(_))
        ));
    }

    #[test]
    fn test_empty_script() {
        let sink = MemorySink::new();
        let mut session = session(&sink);
        let report = run_script(&mut session, &Script::from_json_str("{}").unwrap());
        assert_eq!(report, ScriptReport::default());
    }
}
