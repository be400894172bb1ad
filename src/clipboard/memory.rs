use super::{ClipboardBuffer, ClipboardConnection, ClipboardContents, ClipboardNode};
use crate::config::EditorConfig;
use crate::graph::Position;

#[derive(Debug, Clone)]
struct Buffered {
    contents: ClipboardContents,
    origin: Position,
}

/// Process-local clipboard.
///
/// Stores a detached copy of the selection together with its origin, the centre of the
/// area the copied nodes cover on the canvas.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    node_width: f64,
    node_height: f64,
    buffered: Option<Buffered>,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl MemoryClipboard {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            node_width: config.node_width,
            node_height: config.node_height,
            buffered: None,
        }
    }

    pub fn clear(&mut self) {
        self.buffered = None;
    }

    fn origin_of(&self, nodes: &[ClipboardNode]) -> Position {
        let (left, top, right, bottom) = nodes.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(left, top, right, bottom), node| {
                (
                    left.min(node.position.x),
                    top.min(node.position.y),
                    right.max(node.position.x + self.node_width),
                    bottom.max(node.position.y + self.node_height),
                )
            },
        );
        Position::new(left + (right - left) / 2.0, top + (bottom - top) / 2.0)
    }
}

impl ClipboardBuffer for MemoryClipboard {
    fn copy(&mut self, nodes: Vec<ClipboardNode>, connections: Vec<ClipboardConnection>) {
        if nodes.is_empty() {
            self.buffered = None;
            return;
        }
        let origin = self.origin_of(&nodes);
        self.buffered = Some(Buffered {
            contents: ClipboardContents { nodes, connections },
            origin,
        });
    }

    fn paste(&self, x: f64, y: f64) -> Option<ClipboardContents> {
        let buffered = self.buffered.as_ref()?;
        let delta_x = x - buffered.origin.x;
        let delta_y = y - buffered.origin.y;
        let mut contents = buffered.contents.clone();
        for node in &mut contents.nodes {
            node.position =
                Position::new(node.position.x + delta_x, node.position.y + delta_y).rounded();
        }
        Some(contents)
    }

    fn has_buffered(&self) -> bool {
        self.buffered.is_some()
    }
}
