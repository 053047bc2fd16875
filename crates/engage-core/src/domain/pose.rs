//! Head-pose direction types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Horizontal head turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalDirection {
    /// Turned towards the image-left side.
    Left,
    /// Turned towards the image-right side.
    Right,
    /// Facing the camera.
    #[default]
    Straight,
}

/// Vertical head tilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalDirection {
    /// Tilted up.
    Up,
    /// Tilted down.
    Down,
    /// Level.
    #[default]
    Straight,
}

/// Combined head direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Turned left.
    Left,
    /// Turned right.
    Right,
    /// Tilted up.
    Up,
    /// Tilted down.
    Down,
    /// Facing the camera.
    #[default]
    Straight,
}

impl HorizontalDirection {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Straight => "straight",
        }
    }

    /// Returns true for [`Self::Straight`].
    #[must_use]
    pub const fn is_straight(self) -> bool {
        matches!(self, Self::Straight)
    }

    /// Swaps left and right.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Straight => Self::Straight,
        }
    }
}

impl VerticalDirection {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Straight => "straight",
        }
    }

    /// Returns true for [`Self::Straight`].
    #[must_use]
    pub const fn is_straight(self) -> bool {
        matches!(self, Self::Straight)
    }
}

impl Direction {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Straight => "straight",
        }
    }

    /// Returns true for [`Self::Straight`].
    #[must_use]
    pub const fn is_straight(self) -> bool {
        matches!(self, Self::Straight)
    }
}

impl From<HorizontalDirection> for Direction {
    fn from(h: HorizontalDirection) -> Self {
        match h {
            HorizontalDirection::Left => Self::Left,
            HorizontalDirection::Right => Self::Right,
            HorizontalDirection::Straight => Self::Straight,
        }
    }
}

impl From<VerticalDirection> for Direction {
    fn from(v: VerticalDirection) -> Self {
        match v {
            VerticalDirection::Up => Self::Up,
            VerticalDirection::Down => Self::Down,
            VerticalDirection::Straight => Self::Straight,
        }
    }
}

impl fmt::Display for HorizontalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VerticalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head pose for one face in one frame.
///
/// The default (no face) is straight on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeadPoseResult {
    /// Combined direction.
    pub direction: Direction,
    /// Horizontal axis.
    pub horizontal: HorizontalDirection,
    /// Vertical axis.
    pub vertical: VerticalDirection,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_straight() {
        let pose = HeadPoseResult::default();
        assert!(pose.direction.is_straight());
        assert!(pose.horizontal.is_straight());
        assert!(pose.vertical.is_straight());
    }

    #[test]
    fn test_wire_format() {
        let pose = HeadPoseResult {
            direction: Direction::Left,
            horizontal: HorizontalDirection::Left,
            vertical: VerticalDirection::Down,
        };
        let json = serde_json::to_string(&pose).unwrap();
        assert_eq!(
            json,
            r#"{"direction":"left","horizontal":"left","vertical":"down"}"#
        );
    }

    #[test]
    fn test_axis_conversion() {
        assert_eq!(Direction::from(HorizontalDirection::Right), Direction::Right);
        assert_eq!(Direction::from(VerticalDirection::Up), Direction::Up);
        assert_eq!(HorizontalDirection::Left.mirrored(), HorizontalDirection::Right);
    }
}
