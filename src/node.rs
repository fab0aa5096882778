use iced::widget::canvas::{Frame, LineJoin, Path, Stroke, Text};
use iced::{Color, Point, Rectangle, Size, Vector};
use std::fmt;

use crate::palette;

pub const NODE_WIDTH: f32 = 120.0;
pub const NODE_HEIGHT: f32 = 60.0;
pub const BORDER_WIDTH: f32 = 2.0;
pub const TITLE_SIZE: f32 = 13.0;
const TITLE_CHAR_WIDTH: f32 = 7.0;
const TITLE_MAX_CHARS: usize = 16;

/// Handle of a node inside its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The step a node represents, which also decides how it looks and what counts as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Entry point of a flow, drawn as a pill.
    Trigger,
    /// True/false decision, drawn as a diamond.
    Condition,
    /// Plain step, drawn as a box.
    Action,
}

/// Attachment point on one side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Socket {
    Top,
    Bottom,
    Left,
    Right,
}

impl Socket {
    pub const ALL: [Socket; 4] = [Socket::Top, Socket::Bottom, Socket::Left, Socket::Right];

    /// Top and bottom sockets leave the node vertically.
    pub fn is_vertical(self) -> bool {
        matches!(self, Socket::Top | Socket::Bottom)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    shape: Shape,
    center: Point,
    size: Size,
    title: String,
    selectable: bool,
    movable: bool,
}

impl Node {
    pub fn new(shape: Shape, center: Point, title: impl Into<String>) -> Self {
        Self {
            shape,
            center,
            size: Size::new(NODE_WIDTH, NODE_HEIGHT),
            title: title.into(),
            selectable: true,
            movable: true,
        }
    }

    pub fn trigger(center: Point, title: impl Into<String>) -> Self {
        Self::new(Shape::Trigger, center, title)
    }

    pub fn condition(center: Point, title: impl Into<String>) -> Self {
        Self::new(Shape::Condition, center, title)
    }

    pub fn action(center: Point, title: impl Into<String>) -> Self {
        Self::new(Shape::Action, center, title)
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn is_trigger(&self) -> bool {
        self.shape == Shape::Trigger
    }

    // Only the scene moves or renames nodes, after enforcing its placement rules.
    pub(crate) fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn half_extents(&self) -> Vector {
        Vector::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    pub fn bounds(&self) -> Rectangle {
        let half = self.half_extents();
        Rectangle::new(
            Point::new(self.center.x - half.x, self.center.y - half.y),
            self.size,
        )
    }

    /// Scene position of `socket`, always the midpoint of the matching side.
    pub fn socket_point(&self, socket: Socket) -> Point {
        let half = self.half_extents();
        let c = self.center;
        match socket {
            Socket::Top => Point::new(c.x, c.y - half.y),
            Socket::Bottom => Point::new(c.x, c.y + half.y),
            Socket::Left => Point::new(c.x - half.x, c.y),
            Socket::Right => Point::new(c.x + half.x, c.y),
        }
    }

    /// Corner radius of the pill drawn for triggers.
    pub fn corner_radius(&self) -> f32 {
        (self.size.height / 2.0).min(self.size.width / 2.0)
    }

    /// Diamond through the four sockets, clockwise from the top.
    pub fn diamond(&self) -> [Point; 4] {
        [
            self.socket_point(Socket::Top),
            self.socket_point(Socket::Right),
            self.socket_point(Socket::Bottom),
            self.socket_point(Socket::Left),
        ]
    }

    /// Whether `point` (in scene units) lands on the visible shape.
    pub fn contains(&self, point: Point) -> bool {
        match self.shape {
            Shape::Trigger => in_rounded_rect(self.bounds(), self.corner_radius(), point),
            Shape::Condition => in_polygon(&self.diamond(), point),
            Shape::Action => in_rect(self.bounds(), point),
        }
    }
}

fn in_rect(rect: Rectangle, point: Point) -> bool {
    point.x >= rect.x
        && point.x <= rect.x + rect.width
        && point.y >= rect.y
        && point.y <= rect.y + rect.height
}

fn in_rounded_rect(rect: Rectangle, radius: f32, point: Point) -> bool {
    if !in_rect(rect, point) {
        return false;
    }
    // Distance from the rectangle shrunk by the radius
    let nearest_x = point.x.clamp(rect.x + radius, rect.x + rect.width - radius);
    let nearest_y = point.y.clamp(rect.y + radius, rect.y + rect.height - radius);
    let dx = point.x - nearest_x;
    let dy = point.y - nearest_y;
    dx * dx + dy * dy <= radius * radius
}

/// Even-odd ray cast; points on the outline count as inside.
pub(crate) fn in_polygon(polygon: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if on_segment(a, b, point) {
            return true;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    cross.abs() <= f32::EPSILON * 16.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

pub(crate) fn rounded_rect_path(rect: Rectangle, radius: f32) -> Path {
    Path::new(|builder| {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        let x = rect.x;
        let y = rect.y;
        let w = rect.width;
        let h = rect.height;

        builder.move_to(Point::new(x + r, y));
        builder.line_to(Point::new(x + w - r, y));
        builder.arc_to(Point::new(x + w, y), Point::new(x + w, y + r), r);
        builder.line_to(Point::new(x + w, y + h - r));
        builder.arc_to(Point::new(x + w, y + h), Point::new(x + w - r, y + h), r);
        builder.line_to(Point::new(x + r, y + h));
        builder.arc_to(Point::new(x, y + h), Point::new(x, y + h - r), r);
        builder.line_to(Point::new(x, y + r));
        builder.arc_to(Point::new(x, y), Point::new(x + r, y), r);
        builder.close();
    })
}

fn outline_path(node: &Node) -> Path {
    match node.shape() {
        Shape::Trigger => rounded_rect_path(node.bounds(), node.corner_radius()),
        Shape::Condition => {
            let [top, right, bottom, left] = node.diamond();
            Path::new(|builder| {
                builder.move_to(top);
                builder.line_to(right);
                builder.line_to(bottom);
                builder.line_to(left);
                builder.close();
            })
        }
        Shape::Action => Path::rectangle(node.bounds().position(), node.size()),
    }
}

/// Paint `node` into a frame already transformed into scene space.
///
/// `zoom` keeps the border and title at a constant on-screen size.
pub fn draw_node(frame: &mut Frame, node: &Node, selected: bool, zoom: f32) {
    let outline = outline_path(node);
    frame.fill(&outline, palette::NODE_FILL);

    let border = if selected {
        palette::NODE_BORDER_SELECTED
    } else {
        palette::NODE_BORDER
    };
    frame.stroke(
        &outline,
        Stroke::default()
            .with_color(border)
            .with_width(BORDER_WIDTH / zoom)
            .with_line_join(LineJoin::Round),
    );

    draw_title(frame, node, palette::NODE_TITLE, zoom);
}

fn draw_title(frame: &mut Frame, node: &Node, color: Color, zoom: f32) {
    if node.title().is_empty() {
        return;
    }
    let content = truncate(node.title(), TITLE_MAX_CHARS);
    let size = TITLE_SIZE / zoom;
    let width = content.chars().count() as f32 * TITLE_CHAR_WIDTH / zoom;
    let center = node.center();
    frame.fill_text(Text {
        content,
        position: Point::new(center.x - width / 2.0, center.y - size / 2.0),
        color,
        size: iced::Pixels(size),
        ..Text::default()
    });
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars - 1).collect();
        format!("{kept}…")
    } else {
        text.to_string()
    }
}
