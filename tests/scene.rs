mod common;

use flowboard::edge::{Edge, Endpoint, Mode, Routing};
use flowboard::node::{Node, Socket};
use flowboard::{Hit, SceneError};
use iced::Point;
use pretty_assertions::assert_eq;

use common::{default_scene, wire};

#[test]
fn small_drag_snaps_back_and_keeps_the_wire() {
    let mut scene = default_scene();
    let a = scene.add_node(Node::action(Point::ORIGIN, "A"));
    let b = scene.add_node(Node::action(Point::new(0.0, 100.0), "B"));
    let edge = scene.add_edge(wire(a, b, Mode::Normal)).unwrap();

    let committed = scene.propose_move(a, Point::new(1.0, 1.0)).unwrap();
    assert_eq!(committed, Point::ORIGIN);
    assert_eq!(scene.node(a).unwrap().center(), Point::ORIGIN);

    let route = scene.edge(edge).unwrap().route();
    assert_eq!(route.first().copied(), Some(scene.node(a).unwrap().socket_point(Socket::Bottom)));
    assert_eq!(route.last().copied(), Some(scene.node(b).unwrap().socket_point(Socket::Top)));
}

#[test]
fn moving_a_node_reroutes_but_keeps_the_color() {
    let mut scene = default_scene();
    let check = scene.add_node(Node::condition(Point::ORIGIN, "check"));
    let act = scene.add_node(Node::action(Point::new(0.0, 200.0), "act"));
    let edge = scene.add_edge(wire(check, act, Mode::True)).unwrap();

    let color = scene.edge(edge).unwrap().color();
    let before = scene.edge(edge).unwrap().route().to_vec();

    scene.propose_move(act, Point::new(200.0, 200.0)).unwrap();

    let after = scene.edge(edge).unwrap();
    assert_eq!(after.color(), color);
    assert_eq!(after.mode(), Mode::True);
    assert_ne!(after.route(), before.as_slice());
    assert_eq!(
        after.route().last().copied(),
        Some(Point::new(200.0, 200.0 - 30.0))
    );
}

#[test]
fn changing_mode_changes_only_the_color() {
    let mut scene = default_scene();
    let a = scene.add_node(Node::action(Point::ORIGIN, "a"));
    let b = scene.add_node(Node::action(Point::new(0.0, 100.0), "b"));
    let edge = scene.add_edge(wire(a, b, Mode::Normal)).unwrap();
    let route = scene.edge(edge).unwrap().route().to_vec();

    scene.set_edge_mode(edge, Mode::Error).unwrap();
    let edge = scene.edge(edge).unwrap();
    assert_eq!(edge.color(), Mode::Error.color());
    assert_eq!(edge.route(), route.as_slice());
}

#[test]
fn removing_a_node_takes_its_wires_along() {
    let mut scene = default_scene();
    let start = scene.add_node(Node::trigger(Point::ORIGIN, "start"));
    let middle = scene.add_node(Node::action(Point::new(0.0, 100.0), "middle"));
    let end = scene.add_node(Node::action(Point::new(0.0, 200.0), "end"));
    scene.add_edge(wire(start, middle, Mode::Normal)).unwrap();
    scene.add_edge(wire(middle, end, Mode::Normal)).unwrap();
    let bypass = scene.add_edge(wire(start, end, Mode::Normal)).unwrap();

    scene.remove_node(middle).unwrap();
    assert_eq!(scene.node_count(), 2);
    assert_eq!(scene.edge_count(), 1);
    assert!(scene.edge(bypass).is_some());
    assert_eq!(scene.edges_of(middle).count(), 0);

    assert_eq!(scene.remove_node(start), Err(SceneError::TriggerNotDeletable(start)));
    assert_eq!(scene.remove_node(middle), Err(SceneError::NodeNotFound(middle)));
}

#[test]
fn forks_and_branch_ends() {
    let mut scene = default_scene();
    let check = scene.add_node(Node::condition(Point::ORIGIN, "check"));
    let yes_a = scene.add_node(Node::action(Point::new(-200.0, 150.0), "yes a"));
    let yes_b = scene.add_node(Node::action(Point::new(0.0, 150.0), "yes b"));
    let no = scene.add_node(Node::action(Point::new(200.0, 150.0), "no"));
    scene.add_edge(wire(check, yes_a, Mode::True)).unwrap();
    scene.add_edge(wire(check, yes_b, Mode::True)).unwrap();
    scene.add_edge(wire(check, no, Mode::False)).unwrap();

    assert_eq!(scene.outgoing_with_mode(check, Mode::True).count(), 2);
    assert_eq!(scene.outgoing_with_mode(check, Mode::False).count(), 1);
    assert_eq!(scene.outgoing_with_mode(check, Mode::Error).count(), 0);
    assert_eq!(scene.outgoing(no).count(), 0);
    assert_eq!(scene.incoming(yes_b).count(), 1);
}

#[test]
fn committed_centers_always_obey_placement() {
    let mut scene = default_scene();
    let node = scene.add_node(Node::action(Point::ORIGIN, "roamer"));
    let bounds = scene.bounds();
    let snap = scene.snap_increment();

    let mut x = -7321.5_f32;
    let mut y = -913.25_f32;
    for _ in 0..500 {
        x = (x * 1.37 + 611.3) % 12000.0 - 6000.0;
        y = (y * 1.91 + 277.7) % 11000.0 - 1000.0;

        let committed = scene.propose_move(node, Point::new(x, y)).unwrap();
        assert!(bounds.x <= committed.x && committed.x <= bounds.x + bounds.width);
        assert!(bounds.y <= committed.y && committed.y <= bounds.y + bounds.height);
        assert_eq!(committed.x % snap, 0.0, "x = {}", committed.x);
        assert_eq!(committed.y % snap, 0.0, "y = {}", committed.y);
    }
}

#[test]
fn immovable_nodes_refuse_to_move() {
    let mut scene = default_scene();
    let pinned = scene.add_node(Node::action(Point::ORIGIN, "pinned").with_movable(false));
    assert_eq!(
        scene.propose_move(pinned, Point::new(100.0, 100.0)),
        Err(SceneError::NotMovable(pinned))
    );
    assert_eq!(scene.node(pinned).unwrap().center(), Point::ORIGIN);
}

#[test]
fn orthogonal_routing_only_turns_right_angles() {
    let mut scene = default_scene();
    scene.set_routing(Routing::Orthogonal);
    let a = scene.add_node(Node::action(Point::ORIGIN, "a"));
    let b = scene.add_node(Node::action(Point::new(200.0, 200.0), "b"));
    let edge = scene.add_edge(wire(a, b, Mode::Normal)).unwrap();

    let route = scene.edge(edge).unwrap().route();
    assert!(route.len() >= 3);
    for pair in route.windows(2) {
        assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y, "{pair:?}");
    }
}

#[test]
fn hit_test_prefers_nodes_over_wires() {
    let mut scene = default_scene();
    let a = scene.add_node(Node::action(Point::ORIGIN, "a"));
    let b = scene.add_node(Node::action(Point::new(0.0, 200.0), "b"));
    let edge = scene.add_edge(wire(a, b, Mode::Normal)).unwrap();

    assert_eq!(scene.hit_test(Point::new(0.0, 10.0), 4.0), Hit::Node(a));
    assert_eq!(scene.hit_test(Point::new(2.0, 100.0), 4.0), Hit::Edge(edge));
    assert_eq!(scene.hit_test(Point::new(300.0, 100.0), 4.0), Hit::None);
}

#[test]
fn orthogonal_routes_follow_obstacles_that_move() {
    let mut scene = default_scene();
    scene.set_routing(Routing::Orthogonal);
    let a = scene.add_node(Node::action(Point::ORIGIN, "a"));
    let b = scene.add_node(Node::action(Point::new(300.0, 300.0), "b"));
    let c = scene.add_node(Node::action(Point::new(-600.0, 600.0), "c"));
    let edge = scene
        .add_edge(Edge::new(
            Endpoint::new(a, Socket::Bottom),
            Endpoint::new(b, Socket::Left),
        ))
        .unwrap();

    let elbow_below = vec![Point::new(0.0, 30.0), Point::new(0.0, 300.0), Point::new(240.0, 300.0)];
    assert_eq!(scene.edge(edge).unwrap().route(), elbow_below.as_slice());

    // Dropping c onto the elbow pushes the wire to the other L
    scene.propose_move(c, Point::new(0.0, 200.0)).unwrap();
    let fresh = Routing::Orthogonal.route(
        scene.node(a).unwrap().socket_point(Socket::Bottom),
        Socket::Bottom,
        scene.node(b).unwrap().socket_point(Socket::Left),
        Socket::Left,
        &[scene.node(c).unwrap().bounds()],
    );
    assert_eq!(scene.edge(edge).unwrap().route(), fresh.as_slice());
    assert_eq!(
        fresh,
        vec![Point::new(0.0, 30.0), Point::new(240.0, 30.0), Point::new(240.0, 300.0)]
    );

    scene.remove_node(c).unwrap();
    assert_eq!(scene.edge(edge).unwrap().route(), elbow_below.as_slice());

    let blocker = scene.add_node(Node::action(Point::new(0.0, 200.0), "blocker"));
    assert!(scene.node(blocker).is_some());
    assert_eq!(scene.edge(edge).unwrap().route(), fresh.as_slice());
}
