//! Interactive diagram canvas: nodes and wires on a snapped grid, seen through
//! a zoomable view and driven by mouse gestures.

pub mod canvas;
pub mod config;
pub mod edge;
pub mod error;
pub mod grid;
pub mod input;
pub mod layout;
pub mod node;
pub mod palette;
pub mod scene;
pub mod view;

pub use canvas::{Canvas, CanvasMessage};
pub use config::Config;
pub use edge::{Edge, EdgeId, Endpoint, Mode, Routing};
pub use error::{ConfigError, SceneError};
pub use grid::Grid;
pub use input::{Binding, Command, Input};
pub use node::{Node, NodeId, Shape, Socket};
pub use scene::{Hit, Placement, Scene};
pub use view::{View, ZoomLimits};
