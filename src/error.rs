use thiserror::Error;

use crate::edge::EdgeId;
use crate::node::NodeId;

/// Errors raised by scene mutations that name a node or edge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Node {0} does not exist in this scene")]
    NodeNotFound(NodeId),

    #[error("Edge {0} does not exist in this scene")]
    EdgeNotFound(EdgeId),

    #[error("Node {0} is a trigger and cannot be deleted")]
    TriggerNotDeletable(NodeId),

    #[error("Node {0} is not movable")]
    NotMovable(NodeId),
}

/// Errors that can occur while loading or saving the canvas configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory is available on this platform")]
    NoConfigDir,

    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
