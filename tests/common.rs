//! Shared builders for scene and view tests.
use flowboard::config::Config;
use flowboard::edge::{Edge, Endpoint, Mode};
use flowboard::node::{NodeId, Socket};
use flowboard::{Scene, View};

/// A scene with the default world bounds, grid and snap increment.
#[allow(dead_code)]
pub fn default_scene() -> Scene {
    let config = Config::default();
    Scene::new(config.world.to_rectangle(), config.grid(), config.routing)
}

/// A view with the default zoom limits.
#[allow(dead_code)]
pub fn default_view() -> View {
    let config = Config::default();
    View::new(config.zoom, config.fit_padding)
}

/// Wire from the bottom of `from` to the top of `to`.
#[allow(dead_code)]
pub fn wire(from: NodeId, to: NodeId, mode: Mode) -> Edge {
    Edge::new(
        Endpoint::new(from, Socket::Bottom),
        Endpoint::new(to, Socket::Top),
    )
    .with_mode(mode)
}
