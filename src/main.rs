use iced::widget::canvas;
use iced::{Element, Length, Point, Size, Task, Theme};

use flowboard::edge::{Edge, Endpoint, Mode};
use flowboard::layout::free_position;
use flowboard::node::{NODE_HEIGHT, NODE_WIDTH, Node, Socket};
use flowboard::{Canvas, CanvasMessage, Config, SceneError};

fn main() -> iced::Result {
    env_logger::init();

    iced::application(init, update, view)
        .title("Flowboard")
        .theme(theme)
        .antialiasing(true)
        .run()
}

fn theme(_state: &Flowboard) -> Theme {
    Theme::Dark
}

fn init() -> (Flowboard, Task<Message>) {
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default settings: {e}");
        Config::default()
    });

    let mut canvas = Canvas::new(&config);
    if let Err(e) = build_demo(&mut canvas) {
        log::error!("Failed to build demo diagram: {e}");
    }
    canvas.zoom_to_fit_when_shown();

    (Flowboard { canvas }, Task::none())
}

#[derive(Debug, Clone)]
pub enum Message {
    Canvas(CanvasMessage),
}

struct Flowboard {
    canvas: Canvas,
}

fn update(state: &mut Flowboard, message: Message) -> Task<Message> {
    match message {
        Message::Canvas(msg) => state.canvas.update(msg),
    }
    Task::none()
}

fn view(state: &Flowboard) -> Element<'_, Message> {
    Element::from(
        canvas(&state.canvas)
            .width(Length::Fill)
            .height(Length::Fill),
    )
    .map(Message::Canvas)
}

/// A small automation: one trigger, one decision and its three outcomes.
fn build_demo(canvas: &mut Canvas) -> Result<(), SceneError> {
    let scene = canvas.scene_mut();
    let size = Size::new(NODE_WIDTH, NODE_HEIGHT);

    let start = scene.add_node(Node::trigger(Point::ORIGIN, "Every hour"));
    let check = scene.add_node(Node::condition(Point::new(0.0, 120.0), "Too warm?"));

    let open_at = free_position(scene, Point::new(-160.0, 240.0), size);
    let open = scene.add_node(Node::action(open_at, "Open window"));
    let close_at = free_position(scene, Point::new(160.0, 240.0), size);
    let close = scene.add_node(Node::action(close_at, "Close window"));
    let alert_at = free_position(scene, Point::new(160.0, 240.0), size);
    let alert = scene.add_node(Node::action(alert_at, "Send alert"));

    scene.add_edge(Edge::new(
        Endpoint::new(start, Socket::Bottom),
        Endpoint::new(check, Socket::Top),
    ))?;
    scene.add_edge(
        Edge::new(Endpoint::new(check, Socket::Left), Endpoint::new(open, Socket::Top))
            .with_mode(Mode::True)
            .with_title("yes"),
    )?;
    scene.add_edge(
        Edge::new(Endpoint::new(check, Socket::Right), Endpoint::new(close, Socket::Top))
            .with_mode(Mode::False)
            .with_title("no"),
    )?;
    scene.add_edge(
        Edge::new(Endpoint::new(close, Socket::Bottom), Endpoint::new(alert, Socket::Top))
            .with_mode(Mode::Error)
            .with_title("failed"),
    )?;

    Ok(())
}
