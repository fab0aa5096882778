//! Fixed colours used when painting the canvas.

use iced::Color;

// Background
pub const BACKGROUND: Color = Color::from_rgb8(0, 24, 0);

// Grid lines, brightening towards the axes
pub const GRID_MINOR: Color = Color::from_rgb8(0, 40, 0);
pub const GRID_MEDIUM: Color = Color::from_rgb8(0, 48, 0);
pub const GRID_MAJOR: Color = Color::from_rgb8(0, 56, 0);
pub const GRID_AXIS: Color = Color::from_rgb8(0, 80, 0);

// Nodes
pub const NODE_FILL: Color = Color::from_rgb8(0, 0, 64);
pub const NODE_BORDER: Color = Color::from_rgb8(192, 192, 192);
pub const NODE_BORDER_SELECTED: Color = Color::from_rgb8(255, 200, 64);
pub const NODE_TITLE: Color = Color::from_rgb8(230, 230, 235);

// Wires
pub const WIRE_NORMAL: Color = Color::from_rgb8(192, 192, 192); // gray
pub const WIRE_TRUE: Color = Color::from_rgb8(0, 192, 0); // green
pub const WIRE_FALSE: Color = Color::from_rgb8(192, 0, 0); // red
pub const WIRE_ERROR: Color = Color::from_rgb8(192, 192, 0); // yellow
pub const WIRE_TITLE: Color = Color::from_rgb8(170, 170, 170);
