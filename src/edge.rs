use iced::widget::canvas::{Frame, LineCap, LineJoin, Path, Stroke, Text};
use iced::{Color, Point, Rectangle};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::{NodeId, Socket, truncate};
use crate::palette;

pub const WIRE_WIDTH: f32 = 2.0;
pub const ARROW_LENGTH: f32 = 10.0;
pub const ARROW_HALF_WIDTH: f32 = 4.5;
const TITLE_SIZE: f32 = 11.0;
const TITLE_OFFSET: f32 = 6.0;
const TITLE_MAX_CHARS: usize = 20;

/// Handle of an edge inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome an edge stands for.
///
/// A node may have any number of exits of any mode. Several exits with the
/// same mode fork the flow; a node without exits ends its branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Taken after the step completes.
    #[default]
    Normal,
    /// Taken when a condition evaluates to true.
    True,
    /// Taken when a condition evaluates to false.
    False,
    /// The only exits followed when the step fails.
    Error,
}

impl Mode {
    pub fn color(self) -> Color {
        match self {
            Mode::Normal => palette::WIRE_NORMAL,
            Mode::True => palette::WIRE_TRUE,
            Mode::False => palette::WIRE_FALSE,
            Mode::Error => palette::WIRE_ERROR,
        }
    }

    /// True and false exits only make sense on condition nodes.
    pub fn is_conditional(self) -> bool {
        matches!(self, Mode::True | Mode::False)
    }
}

/// One end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: NodeId,
    pub socket: Socket,
}

impl Endpoint {
    pub fn new(node: NodeId, socket: Socket) -> Self {
        Self { node, socket }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    from: Endpoint,
    to: Endpoint,
    mode: Mode,
    title: String,
    route: Vec<Point>,
}

impl Edge {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            from,
            to,
            mode: Mode::Normal,
            title: String::new(),
            route: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn from(&self) -> Endpoint {
        self.from
    }

    pub fn to(&self) -> Endpoint {
        self.to
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn color(&self) -> Color {
        self.mode.color()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Routed path from the source socket to the target socket.
    pub fn route(&self) -> &[Point] {
        &self.route
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from.node == node || self.to.node == node
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_route(&mut self, route: Vec<Point>) {
        self.route = route;
    }

    /// Shortest distance from `point` to the routed path.
    pub fn distance_to(&self, point: Point) -> f32 {
        self.route
            .windows(2)
            .map(|segment| distance_to_segment(point, segment[0], segment[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let nearest = Point::new(a.x + t * dx, a.y + t * dy);
    p.distance(nearest)
}

/// How the path between two sockets is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    /// Single straight segment between the sockets.
    #[default]
    Straight,
    /// Axis-aligned I, L or Z path following the socket directions.
    Orthogonal,
}

impl Routing {
    /// Path from `from` to `to`. Depends only on its arguments.
    ///
    /// `obstacles` are the bounds of the nodes the path should avoid; only
    /// the orthogonal router consults them, to pick between the two L shapes.
    pub fn route(
        self,
        from: Point,
        from_socket: Socket,
        to: Point,
        to_socket: Socket,
        obstacles: &[Rectangle],
    ) -> Vec<Point> {
        match self {
            Routing::Straight => vec![from, to],
            Routing::Orthogonal => orthogonal(from, from_socket, to, to_socket, obstacles),
        }
    }
}

fn orthogonal(
    from: Point,
    from_socket: Socket,
    to: Point,
    to_socket: Socket,
    obstacles: &[Rectangle],
) -> Vec<Point> {
    let path = match (from_socket.is_vertical(), to_socket.is_vertical()) {
        (true, true) => {
            let mid_y = (from.y + to.y) / 2.0;
            vec![from, Point::new(from.x, mid_y), Point::new(to.x, mid_y), to]
        }
        (false, false) => {
            let mid_x = (from.x + to.x) / 2.0;
            vec![from, Point::new(mid_x, from.y), Point::new(mid_x, to.y), to]
        }
        (vertical, _) => {
            let (primary, alternate) = if vertical {
                (Point::new(from.x, to.y), Point::new(to.x, from.y))
            } else {
                (Point::new(to.x, from.y), Point::new(from.x, to.y))
            };
            let primary = vec![from, primary, to];
            let alternate = vec![from, alternate, to];
            if crossings(&alternate, obstacles) < crossings(&primary, obstacles) {
                alternate
            } else {
                primary
            }
        }
    };
    simplify(path)
}

/// Drop repeated and collinear interior points.
fn simplify(path: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(path.len());
    for point in path {
        if out.last() == Some(&point) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let collinear = (a.x == b.x && b.x == point.x) || (a.y == b.y && b.y == point.y);
            if collinear {
                out.pop();
            }
        }
        out.push(point);
    }
    out
}

fn crossings(path: &[Point], obstacles: &[Rectangle]) -> usize {
    obstacles
        .iter()
        .filter(|rect| {
            path.windows(2)
                .any(|segment| segment_hits_rect(segment[0], segment[1], rect))
        })
        .count()
}

// Segments are axis aligned, so overlap of the segment's box with the
// rectangle's interior is an exact test. Touching the outline is not a hit.
fn segment_hits_rect(a: Point, b: Point, rect: &Rectangle) -> bool {
    a.x.max(b.x) > rect.x
        && a.x.min(b.x) < rect.x + rect.width
        && a.y.max(b.y) > rect.y
        && a.y.min(b.y) < rect.y + rect.height
}

/// Paint `edge` into a frame already transformed into scene space.
pub fn draw_edge(frame: &mut Frame, edge: &Edge, zoom: f32) {
    let route = edge.route();
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return;
    };
    let color = edge.color();

    let wire = Path::new(|builder| {
        builder.move_to(first);
        for &point in &route[1..] {
            builder.line_to(point);
        }
    });
    frame.stroke(
        &wire,
        Stroke::default()
            .with_color(color)
            .with_width(WIRE_WIDTH / zoom)
            .with_line_cap(LineCap::Round)
            .with_line_join(LineJoin::Round),
    );

    if route.len() >= 2 {
        draw_arrow_head(frame, route[route.len() - 2], last, color, zoom);
    }

    if !edge.title().is_empty() {
        frame.fill_text(Text {
            content: truncate(edge.title(), TITLE_MAX_CHARS),
            position: Point::new(first.x + TITLE_OFFSET / zoom, first.y + TITLE_OFFSET / zoom),
            color: palette::WIRE_TITLE,
            size: iced::Pixels(TITLE_SIZE / zoom),
            ..Text::default()
        });
    }
}

fn draw_arrow_head(frame: &mut Frame, before: Point, tip: Point, color: Color, zoom: f32) {
    let length = before.distance(tip);
    if length <= f32::EPSILON {
        return;
    }
    let (ux, uy) = ((tip.x - before.x) / length, (tip.y - before.y) / length);
    let back = ARROW_LENGTH / zoom;
    let half = ARROW_HALF_WIDTH / zoom;
    let base = Point::new(tip.x - ux * back, tip.y - uy * back);

    let head = Path::new(|builder| {
        builder.move_to(tip);
        builder.line_to(Point::new(base.x - uy * half, base.y + ux * half));
        builder.line_to(Point::new(base.x + uy * half, base.y - ux * half));
        builder.close();
    });
    frame.fill(&head, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    #[test]
    fn color_follows_mode() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert_eq!(Mode::Normal.color(), Color::from_rgb8(192, 192, 192));
        assert_eq!(Mode::True.color(), Color::from_rgb8(0, 192, 0));
        assert_eq!(Mode::False.color(), Color::from_rgb8(192, 0, 0));
        assert_eq!(Mode::Error.color(), Color::from_rgb8(192, 192, 0));

        let mut edge = Edge::new(
            Endpoint::new(NodeId(0), Socket::Bottom),
            Endpoint::new(NodeId(1), Socket::Top),
        );
        assert_eq!(edge.color(), palette::WIRE_NORMAL);
        edge.set_mode(Mode::Error);
        assert_eq!(edge.color(), palette::WIRE_ERROR);
    }

    #[test]
    fn straight_route_has_two_points() {
        let route = Routing::Straight.route(
            Point::new(0.0, 30.0),
            Socket::Bottom,
            Point::new(50.0, 70.0),
            Socket::Top,
            &[],
        );
        assert_eq!(route, vec![Point::new(0.0, 30.0), Point::new(50.0, 70.0)]);
    }

    #[test]
    fn orthogonal_route_is_z_shaped_between_parallel_sockets() {
        let route = Routing::Orthogonal.route(
            Point::new(0.0, 30.0),
            Socket::Bottom,
            Point::new(100.0, 130.0),
            Socket::Top,
            &[],
        );
        assert_eq!(
            route,
            vec![
                Point::new(0.0, 30.0),
                Point::new(0.0, 80.0),
                Point::new(100.0, 80.0),
                Point::new(100.0, 130.0),
            ]
        );
    }

    #[test]
    fn orthogonal_route_collapses_to_a_line_when_aligned() {
        let route = Routing::Orthogonal.route(
            Point::new(0.0, 30.0),
            Socket::Bottom,
            Point::new(0.0, 130.0),
            Socket::Top,
            &[],
        );
        assert_eq!(route, vec![Point::new(0.0, 30.0), Point::new(0.0, 130.0)]);
    }

    #[test]
    fn orthogonal_l_route_avoids_obstacles() {
        let from = Point::new(0.0, 30.0);
        let to = Point::new(200.0, 200.0);

        let clear = Routing::Orthogonal.route(from, Socket::Bottom, to, Socket::Left, &[]);
        assert_eq!(clear, vec![from, Point::new(0.0, 200.0), to]);

        // Block the primary elbow's vertical leg.
        let wall = Rectangle::new(Point::new(-20.0, 100.0), Size::new(40.0, 40.0));
        let detour = Routing::Orthogonal.route(from, Socket::Bottom, to, Socket::Left, &[wall]);
        assert_eq!(detour, vec![from, Point::new(200.0, 30.0), to]);
    }

    #[test]
    fn distance_to_route() {
        let mut edge = Edge::new(
            Endpoint::new(NodeId(0), Socket::Right),
            Endpoint::new(NodeId(1), Socket::Left),
        );
        assert_eq!(edge.distance_to(Point::ORIGIN), f32::INFINITY);

        edge.set_route(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        assert_eq!(edge.distance_to(Point::new(50.0, 5.0)), 5.0);
        assert_eq!(edge.distance_to(Point::new(-3.0, 4.0)), 5.0);
    }
}
