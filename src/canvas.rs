use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Position;

/// Coordinate space and sizing options a layout is expressed in.
///
/// All values are in canvas units. Deserialization accepts camelCase keys and falls back
/// to the default for every missing field, so `{"nodeWidth": 180}` is a valid canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Canvas {
    pub width: i32,
    pub height: i32,
    pub node_width: i32,
    pub node_height: i32,
    pub padding_x: i32,
    pub padding_y: i32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1000,
            node_width: 220,
            node_height: 80,
            padding_x: 60,
            padding_y: 100,
        }
    }
}

impl Canvas {
    /// Parse a canvas from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let canvas: Canvas = serde_json::from_str(json)?;
        canvas.validate()?;
        Ok(canvas)
    }

    /// Sizes must be positive, paddings non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("nodeWidth", self.node_width),
            ("nodeHeight", self.node_height),
        ];
        if let Some((field, value)) = positive.into_iter().find(|(_, v)| *v <= 0) {
            return Err(ConfigError::Invalid { field, value });
        }

        let non_negative = [("paddingX", self.padding_x), ("paddingY", self.padding_y)];
        if let Some((field, value)) = non_negative.into_iter().find(|(_, v)| *v < 0) {
            return Err(ConfigError::Invalid { field, value });
        }
        Ok(())
    }

    /// Horizontal distance between the left edges of two neighbouring nodes in a row.
    pub fn pitch_x(&self) -> i32 {
        self.node_width + self.padding_x
    }

    /// Vertical distance between two consecutive levels.
    pub fn row_height(&self) -> i32 {
        self.node_height + self.padding_y
    }

    /// Two node boxes collide when they are closer than one node plus half the padding
    /// on both axes.
    pub fn collides(&self, a: Position, b: Position) -> bool {
        let dx = (i64::from(a.x) - i64::from(b.x)).abs();
        let dy = (i64::from(a.y) - i64::from(b.y)).abs();
        dx < i64::from(self.node_width + self.padding_x / 2)
            && dy < i64::from(self.node_height + self.padding_y / 2)
    }

    /// True if a node placed at `candidate` would collide with any of `placed`.
    pub(crate) fn is_occupied<'a>(
        &self,
        candidate: Position,
        mut placed: impl Iterator<Item = &'a Position>,
    ) -> bool {
        placed.any(|p| self.collides(candidate, *p))
    }
}
