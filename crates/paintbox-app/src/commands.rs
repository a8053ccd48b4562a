//! Commands sent to a session by toolbars, pickers and headers.

use paintbox_core::{BrushShape, ToolKind};
use paintbox_render::ExportKind;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

/// Something the user asked the canvas to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    SetTool(ToolKind),
    /// Hex color, `#rrggbb` or `#rgb`.
    SetColor(String),
    SetSize(f32),
    SetOpacity(f32),
    SetShape(BrushShape),
    SetZoom(f64),
    SetPan { x: f64, y: f64 },
    /// Zoom by `factor` keeping the view point `(x, y)` in place.
    ZoomAt { x: f64, y: f64, factor: f64 },
    ResetView,
    /// Background reference from the gallery; `None` removes it.
    SetBackground(Option<String>),
    Undo,
    Redo,
    Export(ExportKind),
}

/// Sending half of a session's command channel.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Queue a command. Returns false if the session is gone.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Receiving half, owned by the session.
#[derive(Debug)]
pub(crate) struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub(crate) fn sender(&self) -> CommandSender {
        CommandSender { tx: self.tx.clone() }
    }

    /// Next queued command, if any.
    pub(crate) fn next(&self) -> Option<Command> {
        match self.rx.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            // The queue holds its own sender, so this never happens.
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        assert!(sender.send(Command::SetTool(ToolKind::Marker)));
        assert!(sender.clone().send(Command::Undo));

        assert_eq!(queue.next(), Some(Command::SetTool(ToolKind::Marker)));
        assert_eq!(queue.next(), Some(Command::Undo));
        assert_eq!(queue.next(), None);
    }

    #[test]
    fn test_sender_outliving_queue() {
        let queue = CommandQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.send(Command::Redo));
    }

    #[test]
    fn test_json_form() {
        let commands: Vec<Command> = serde_json::from_str(
            r##"[
                {"set_tool": "spray"},
                {"set_color": "#ff8800"},
                {"set_pan": {"x": 4.0, "y": -2.0}},
                {"set_background": null},
                {"zoom_at": {"x": 10.0, "y": 20.0, "factor": 1.5}},
                "reset_view",
                "undo",
                {"export": "document"}
            ]"##,
        )
        .unwrap();
        assert_eq!(
            commands,
            vec![
                Command::SetTool(ToolKind::Spray),
                Command::SetColor("#ff8800".to_string()),
                Command::SetPan { x: 4.0, y: -2.0 },
                Command::SetBackground(None),
                Command::ZoomAt { x: 10.0, y: 20.0, factor: 1.5 },
                Command::ResetView,
                Command::Undo,
                Command::Export(ExportKind::Document),
            ]
        );
    }
}
