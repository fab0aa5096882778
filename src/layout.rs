use iced::{Point, Rectangle, Size};

use crate::scene::Scene;

const ROW_GAP: f32 = 20.0;
const MAX_ROWS: usize = 50;

/// Find a spot for a new node of `size`, starting at `preferred` and walking
/// down one row at a time until it no longer overlaps an existing node.
///
/// Every candidate already obeys the scene's placement rules, so the result
/// can be handed to `Scene::add_node` unchanged.
pub fn free_position(scene: &Scene, preferred: Point, size: Size) -> Point {
    let placement = scene.placement();
    let row_height = size.height + ROW_GAP;

    for row in 0..MAX_ROWS {
        let candidate = placement.enforce(Point::new(
            preferred.x,
            preferred.y + row as f32 * row_height,
        ));

        let footprint = Rectangle::new(
            Point::new(
                candidate.x - size.width / 2.0 - ROW_GAP / 2.0,
                candidate.y - size.height / 2.0 - ROW_GAP / 2.0,
            ),
            Size::new(size.width + ROW_GAP, size.height + ROW_GAP),
        );
        let overlaps = scene
            .nodes()
            .any(|(_, node)| overlap(footprint, node.bounds()));

        if !overlaps {
            return candidate;
        }
    }

    placement.enforce(preferred)
}

fn overlap(a: Rectangle, b: Rectangle) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Routing;
    use crate::grid::Grid;
    use crate::node::{NODE_HEIGHT, NODE_WIDTH, Node};

    fn scene() -> Scene {
        Scene::new(
            Rectangle::new(Point::new(-1000.0, -1000.0), Size::new(2000.0, 2000.0)),
            Grid::new(20, 10),
            Routing::Straight,
        )
    }

    #[test]
    fn empty_scene_keeps_preferred_spot() {
        let scene = scene();
        let size = Size::new(NODE_WIDTH, NODE_HEIGHT);
        assert_eq!(free_position(&scene, Point::new(3.0, 4.0), size), Point::ORIGIN);
    }

    #[test]
    fn walks_down_past_occupied_rows() {
        let mut scene = scene();
        let size = Size::new(NODE_WIDTH, NODE_HEIGHT);
        scene.add_node(Node::action(Point::ORIGIN, "a"));
        scene.add_node(Node::action(Point::new(0.0, 80.0), "b"));

        let spot = free_position(&scene, Point::ORIGIN, size);
        assert_eq!(spot, Point::new(0.0, 160.0));
        assert_eq!(spot, scene.placement().enforce(spot));
    }
}
