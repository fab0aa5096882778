use iced::{Point, Rectangle, Size};
use std::collections::{BTreeMap, BTreeSet};

use crate::edge::{Edge, EdgeId, Mode, Routing};
use crate::error::SceneError;
use crate::grid::Grid;
use crate::node::{Node, NodeId, Shape};

/// Rules every committed node center must satisfy: inside the world bounds and
/// on the snap grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    bounds: Rectangle,
    snap: f32,
}

impl Placement {
    pub fn new(bounds: Rectangle, snap: f32) -> Self {
        Self { bounds, snap }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn snap(&self) -> f32 {
        self.snap
    }

    /// Clamp `proposed` into the bounds, then snap each coordinate to the
    /// nearest multiple of the snap increment.
    ///
    /// Ties round to even (`15` with increment `10` becomes `20`, `25` becomes
    /// `20`). A snapped value that would land just outside the bounds steps
    /// one increment back inside.
    pub fn enforce(&self, proposed: Point) -> Point {
        let b = self.bounds;
        Point::new(
            snap_axis(proposed.x, b.x, b.x + b.width, self.snap),
            snap_axis(proposed.y, b.y, b.y + b.height, self.snap),
        )
    }
}

fn snap_axis(value: f32, low: f32, high: f32, step: f32) -> f32 {
    let value = if value.is_finite() { value.clamp(low, high) } else { low };
    let mut snapped = (value / step).round_ties_even() * step;
    if snapped > high {
        snapped -= step;
    }
    if snapped < low {
        snapped += step;
    }
    snapped
}

/// What lies under a scene point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    None,
    Node(NodeId),
    Edge(EdgeId),
}

/// Owner of all nodes and edges, together with the world bounds and grid they
/// live on.
///
/// Nodes and edges are only changed through the scene so the placement and
/// routing invariants always hold: a committed center is clamped and snapped
/// before any attached edge is routed from it.
#[derive(Debug, Clone)]
pub struct Scene {
    placement: Placement,
    grid: Grid,
    routing: Routing,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    selection: BTreeSet<NodeId>,
    next_node: u32,
    next_edge: u32,
}

impl Scene {
    pub fn new(bounds: Rectangle, grid: Grid, routing: Routing) -> Self {
        Self {
            placement: Placement::new(bounds, grid.snap_increment()),
            grid,
            routing,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            selection: BTreeSet::new(),
            next_node: 0,
            next_edge: 0,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.placement.bounds()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn snap_increment(&self) -> f32 {
        self.placement.snap()
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    /// Switch routing strategy and re-route every edge.
    pub fn set_routing(&mut self, routing: Routing) {
        self.routing = routing;
        let ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        for id in ids {
            self.reroute(id);
        }
    }

    // -- Nodes --

    /// Take ownership of `node`, placing it at the nearest legal position.
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let center = self.placement.enforce(node.center());
        node.set_center(center);
        log::debug!(
            "Added {:?} node {id} '{}' at ({}, {})",
            node.shape(),
            node.title(),
            center.x,
            center.y
        );
        self.nodes.insert(id, node);
        self.reroute_after_change(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move `id` towards `proposed`, returning the position actually committed.
    ///
    /// Runs for every intermediate position of a drag, not only on drop.
    pub fn propose_move(&mut self, id: NodeId, proposed: Point) -> Result<Point, SceneError> {
        let placement = self.placement;
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        if !node.is_movable() {
            return Err(SceneError::NotMovable(id));
        }

        let committed = placement.enforce(proposed);
        if committed != node.center() {
            node.set_center(committed);
            self.reroute_after_change(id);
        }
        Ok(committed)
    }

    pub fn set_node_title(&mut self, id: NodeId, title: impl Into<String>) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        node.set_title(title.into());
        Ok(())
    }

    /// Remove `id` and every edge attached to it. Triggers are refused.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, SceneError> {
        match self.nodes.get(&id) {
            None => return Err(SceneError::NodeNotFound(id)),
            Some(node) if node.is_trigger() => return Err(SceneError::TriggerNotDeletable(id)),
            Some(_) => {}
        }

        let before = self.edges.len();
        self.edges.retain(|_, edge| !edge.touches(id));
        self.selection.remove(&id);
        log::debug!(
            "Removed node {id} and {} attached edge(s)",
            before - self.edges.len()
        );
        let removed = self.nodes.remove(&id).ok_or(SceneError::NodeNotFound(id))?;
        self.reroute_after_change(id);
        Ok(removed)
    }

    /// Remove every selected node that can be removed; triggers stay.
    pub fn remove_selected(&mut self) -> Vec<NodeId> {
        let selected: Vec<NodeId> = self.selection.iter().copied().collect();
        let mut removed = Vec::new();
        for id in selected {
            match self.remove_node(id) {
                Ok(_) => removed.push(id),
                Err(e) => log::debug!("Kept selected node: {e}"),
            }
        }
        removed
    }

    // -- Edges --

    /// Connect two live nodes. The route is computed immediately.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, SceneError> {
        let from = edge.from();
        let to = edge.to();
        let source = self
            .nodes
            .get(&from.node)
            .ok_or(SceneError::NodeNotFound(from.node))?;
        if !self.nodes.contains_key(&to.node) {
            return Err(SceneError::NodeNotFound(to.node));
        }
        if edge.mode().is_conditional() && source.shape() != Shape::Condition {
            log::warn!(
                "{:?} edge leaves {:?} node {}; only conditions decide true/false",
                edge.mode(),
                source.shape(),
                from.node
            );
        }

        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(id, edge);
        self.reroute(id);
        log::debug!("Added edge {id} from {} to {}", from.node, to.node);
        Ok(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(&id, edge)| (id, edge))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges with `node` at either end.
    pub fn edges_of(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.touches(node))
    }

    /// Exits of `node`. An empty result means the branch ends there.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.from().node == node)
    }

    /// Exits of `node` taken for one outcome; more than one means a fork.
    pub fn outgoing_with_mode(&self, node: NodeId, mode: Mode) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.outgoing(node).filter(move |(_, edge)| edge.mode() == mode)
    }

    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.to().node == node)
    }

    pub fn set_edge_mode(&mut self, id: EdgeId, mode: Mode) -> Result<(), SceneError> {
        let edge = self.edges.get_mut(&id).ok_or(SceneError::EdgeNotFound(id))?;
        edge.set_mode(mode);
        Ok(())
    }

    pub fn set_edge_title(&mut self, id: EdgeId, title: impl Into<String>) -> Result<(), SceneError> {
        let edge = self.edges.get_mut(&id).ok_or(SceneError::EdgeNotFound(id))?;
        edge.set_title(title.into());
        Ok(())
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, SceneError> {
        self.edges.remove(&id).ok_or(SceneError::EdgeNotFound(id))
    }

    /// Refresh routes after `node` was added, moved or removed.
    ///
    /// Orthogonal routes also depend on every other node's bounds, so they
    /// are all recomputed; straight routes only change at their own ends.
    fn reroute_after_change(&mut self, node: NodeId) {
        let stale: Vec<EdgeId> = match self.routing {
            Routing::Straight => self.edges_of(node).map(|(id, _)| id).collect(),
            Routing::Orthogonal => self.edges.keys().copied().collect(),
        };
        for id in stale {
            self.reroute(id);
        }
    }

    fn reroute(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get(&id) else {
            return;
        };
        let (from, to) = (edge.from(), edge.to());
        let (Some(source), Some(target)) = (self.nodes.get(&from.node), self.nodes.get(&to.node)) else {
            return;
        };

        let obstacles: Vec<Rectangle> = self
            .nodes
            .iter()
            .filter(|&(&other, _)| other != from.node && other != to.node)
            .map(|(_, node)| node.bounds())
            .collect();
        let route = self.routing.route(
            source.socket_point(from.socket),
            from.socket,
            target.socket_point(to.socket),
            to.socket,
            &obstacles,
        );

        if let Some(edge) = self.edges.get_mut(&id) {
            edge.set_route(route);
        }
    }

    // -- Selection --

    /// Select `id`. Without `additive` the previous selection is replaced.
    ///
    /// Returns whether the node ended up selected; non-selectable nodes never are.
    pub fn select(&mut self, id: NodeId, additive: bool) -> Result<bool, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        if !additive {
            self.selection.clear();
        }
        if !node.is_selectable() {
            return Ok(false);
        }
        self.selection.insert(id);
        Ok(true)
    }

    pub fn toggle_selection(&mut self, id: NodeId) -> Result<bool, SceneError> {
        if self.selection.remove(&id) {
            return Ok(false);
        }
        self.select(id, true)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selection(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.selection.iter().copied()
    }

    // -- Queries --

    /// Topmost node containing `point`, else the nearest edge within `tolerance`.
    pub fn hit_test(&self, point: Point, tolerance: f32) -> Hit {
        // Later nodes are painted on top, so they win.
        if let Some((&id, _)) = self.nodes.iter().rev().find(|(_, node)| node.contains(point)) {
            return Hit::Node(id);
        }

        self.edges
            .iter()
            .map(|(&id, edge)| (id, edge.distance_to(point)))
            .filter(|&(_, distance)| distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| Hit::Edge(id))
            .unwrap_or(Hit::None)
    }

    /// Smallest rectangle holding every node, or `None` for an empty scene.
    pub fn items_bounding_rect(&self) -> Option<Rectangle> {
        let mut nodes = self.nodes.values().map(Node::bounds);
        let first = nodes.next()?;
        let (mut left, mut top) = (first.x, first.y);
        let (mut right, mut bottom) = (first.x + first.width, first.y + first.height);
        for rect in nodes {
            left = left.min(rect.x);
            top = top.min(rect.y);
            right = right.max(rect.x + rect.width);
            bottom = bottom.max(rect.y + rect.height);
        }
        Some(Rectangle::new(
            Point::new(left, top),
            Size::new(right - left, bottom - top),
        ))
    }
}
