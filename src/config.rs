use crate::error::ConfigError;
use crate::graph::Position;
use serde::Deserialize;
use std::fs;

/// Layout constants used by the engine.
///
/// None of these values affect graph topology; they only decide where synthetic and
/// generated nodes land on the canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Canvas position of the synthetic input node.
    pub input_node_position: Position,
    /// Where the top-left corner of an extracted selection lands in the nested chain.
    pub nested_anchor: Position,
    /// Horizontal distance between the selection's right edge and the output placeholder column.
    pub output_column_gap: f64,
    /// Vertical distance between consecutive output placeholders.
    pub output_row_spacing: f64,
    /// Nominal rendered node width, used to compute clipboard origins.
    pub node_width: f64,
    /// Nominal rendered node height, used to compute clipboard origins.
    pub node_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            input_node_position: Position::new(50.0, 150.0),
            nested_anchor: Position::new(250.0, 150.0),
            output_column_gap: 250.0,
            output_row_spacing: 75.0,
            node_width: 170.0,
            node_height: 50.0,
        }
    }
}

impl EditorConfig {
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    /// Parses a configuration document. Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration document from disk.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Default)]
pub struct EditorConfigBuilder {
    config: EditorConfig,
}

impl EditorConfigBuilder {
    pub fn input_node_position(mut self, x: f64, y: f64) -> Self {
        self.config.input_node_position = Position::new(x, y);
        self
    }
    pub fn nested_anchor(mut self, x: f64, y: f64) -> Self {
        self.config.nested_anchor = Position::new(x, y);
        self
    }
    pub fn output_column(mut self, gap: f64, row_spacing: f64) -> Self {
        self.config.output_column_gap = gap;
        self.config.output_row_spacing = row_spacing;
        self
    }
    pub fn node_size(mut self, width: f64, height: f64) -> Self {
        self.config.node_width = width;
        self.config.node_height = height;
        self
    }
    pub fn build(self) -> EditorConfig {
        self.config
    }
}
