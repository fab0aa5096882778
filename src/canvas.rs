use iced::keyboard::Modifiers;
use iced::widget::canvas::{self, Cache, Frame, Geometry, Path, Stroke};
use iced::{Point, Rectangle, Size, Vector, mouse};

use crate::config::Config;
use crate::edge::draw_edge;
use crate::input::{self, Binding, Command, Input};
use crate::node::{NodeId, draw_node};
use crate::palette;
use crate::scene::{Hit, Scene};
use crate::view::{CursorKind, View, WheelRoute};

/// Pick radius around the cursor, in screen pixels.
pub const HIT_TOLERANCE: f32 = 6.0;
/// Screen pixels scrolled per wheel line.
pub const SCROLL_LINE: f32 = 40.0;

#[derive(Debug, Clone)]
pub enum CanvasMessage {
    Select { node: NodeId, additive: bool },
    NodeDragged { node: NodeId, proposed: Point },
    NodeDragEnded { node: NodeId },
    BeginPan { clear_selection: bool },
    Pan(Vector),
    EndPan,
    Wheel { delta: Vector, modifiers: Modifiers, anchor: Point },
    Command(Command),
    ViewportResized(Size),
}

/// One scene and the one view looking at it.
pub struct Canvas {
    scene: Scene,
    view: View,
    bindings: Vec<Binding>,
    cache: Cache,
    fit_pending: bool,
}

impl Canvas {
    pub fn new(config: &Config) -> Self {
        Self {
            scene: Scene::new(config.world.to_rectangle(), config.grid(), config.routing),
            view: View::new(config.zoom, config.fit_padding),
            bindings: config.bindings.clone(),
            cache: Cache::new(),
            fit_pending: false,
        }
    }

    /// Zoom to fit once the real canvas size is known.
    pub fn zoom_to_fit_when_shown(&mut self) {
        self.fit_pending = true;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Mutable scene access for the host; the next frame is repainted.
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.cache.clear();
        &mut self.scene
    }

    pub fn view_mut(&mut self) -> &mut View {
        self.cache.clear();
        &mut self.view
    }

    pub fn update(&mut self, message: CanvasMessage) {
        match message {
            CanvasMessage::Select { node, additive } => {
                let result = if additive {
                    self.scene.toggle_selection(node)
                } else {
                    self.scene.select(node, false)
                };
                if let Err(e) = result {
                    log::debug!("Selection ignored: {e}");
                }
            }
            CanvasMessage::NodeDragged { node, proposed } => {
                if let Err(e) = self.scene.propose_move(node, proposed) {
                    log::debug!("Drag ignored: {e}");
                }
            }
            CanvasMessage::NodeDragEnded { node } => {
                if let Some(moved) = self.scene.node(node) {
                    let center = moved.center();
                    log::debug!("Node {node} dropped at ({}, {})", center.x, center.y);
                }
            }
            CanvasMessage::BeginPan { clear_selection } => {
                if clear_selection {
                    self.scene.clear_selection();
                }
                self.view.set_cursor(CursorKind::ClosedHand);
            }
            CanvasMessage::Pan(delta) => {
                self.view.pan_by(delta);
            }
            CanvasMessage::EndPan => {
                self.view.set_cursor(CursorKind::Normal);
            }
            CanvasMessage::Wheel {
                delta,
                modifiers,
                anchor,
            } => match self.view.route_wheel(delta, modifiers, anchor) {
                WheelRoute::Zoom { .. } => {}
                // Plain scrolling moves the view
                WheelRoute::Scroll(delta) => self.view.pan_by(delta),
            },
            CanvasMessage::Command(command) => self.run(command),
            CanvasMessage::ViewportResized(size) => {
                self.view.set_viewport(size);
                if std::mem::take(&mut self.fit_pending) {
                    self.run(Command::ZoomToFit);
                }
            }
        }
        self.cache.clear();
    }

    /// Execute a toolbar, keyboard or gesture command.
    pub fn run(&mut self, command: Command) {
        match command {
            Command::ZoomIn => {
                self.view.zoom_in();
            }
            Command::ZoomOut => {
                self.view.zoom_out();
            }
            Command::ZoomReset => self.view.zoom_reset(),
            Command::ZoomToFit => {
                self.view.zoom_to_fit(self.scene.items_bounding_rect());
            }
            Command::CenterOrigin => self.view.center_on(Point::ORIGIN),
            Command::DeleteSelection => {
                let removed = self.scene.remove_selected();
                log::debug!("Deleted {} selected node(s)", removed.len());
            }
        }
        self.cache.clear();
    }

    fn hit_at(&self, screen: Point) -> Hit {
        let scene_point = self.view.screen_to_scene(screen);
        self.scene
            .hit_test(scene_point, HIT_TOLERANCE / self.view.zoom())
    }

    fn press(&self, state: &mut Interaction, descriptor: &str, position: Point) -> Option<CanvasMessage> {
        match descriptor {
            "left-click" => match self.hit_at(position) {
                Hit::Node(node) => {
                    let movable = self.scene.node(node).is_some_and(|n| n.is_movable());
                    if movable {
                        let grab = self.view.screen_to_scene(position);
                        let center = self.scene.node(node).map(|n| n.center()).unwrap_or(grab);
                        state.gesture = Gesture::Dragging {
                            node,
                            grab: Vector::new(grab.x - center.x, grab.y - center.y),
                        };
                    }
                    Some(CanvasMessage::Select {
                        node,
                        additive: false,
                    })
                }
                Hit::Edge(_) | Hit::None => {
                    state.gesture = Gesture::Panning { last: position };
                    Some(CanvasMessage::BeginPan {
                        clear_selection: true,
                    })
                }
            },
            "ctrl-left-click" | "shift-left-click" => match self.hit_at(position) {
                Hit::Node(node) => Some(CanvasMessage::Select {
                    node,
                    additive: true,
                }),
                Hit::Edge(_) | Hit::None => None,
            },
            "middle-click" => {
                state.gesture = Gesture::Panning { last: position };
                Some(CanvasMessage::BeginPan {
                    clear_selection: false,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging { node: NodeId, grab: Vector },
    Panning { last: Point },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Interaction {
    pub modifiers: Modifiers,
    pub gesture: Gesture,
}

fn publish(message: CanvasMessage) -> Option<canvas::Action<CanvasMessage>> {
    Some(canvas::Action::publish(message))
}

impl canvas::Program<CanvasMessage> for Canvas {
    type State = Interaction;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let content = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, bounds.size(), palette::BACKGROUND);

            let transform = self.view.transform();
            let zoom = transform.scale;
            let top_left = transform.invert(Point::ORIGIN);
            let visible = Rectangle::new(
                top_left,
                Size::new(bounds.width / zoom, bounds.height / zoom),
            );

            frame.translate(transform.translation);
            frame.scale(zoom);

            draw_grid(frame, &self.scene, visible, zoom);

            // Wires first so nodes cover their ends
            for (_, edge) in self.scene.edges() {
                draw_edge(frame, edge, zoom);
            }
            for (id, node) in self.scene.nodes() {
                draw_node(frame, node, self.scene.is_selected(id), zoom);
            }
        });

        vec![content]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<CanvasMessage>> {
        if let iced::Event::Keyboard(iced::keyboard::Event::ModifiersChanged(modifiers)) = event {
            state.modifiers = *modifiers;
            return None;
        }

        match event {
            // Size changes ride on window events so no input is swallowed
            iced::Event::Window(_) if bounds.size() != self.view.viewport() => {
                publish(CanvasMessage::ViewportResized(bounds.size()))
            }
            // Releases end gestures even when the cursor left the canvas
            iced::Event::Mouse(mouse::Event::ButtonReleased(button)) => {
                let input = Input::Button {
                    button: *button,
                    modifiers: state.modifiers,
                };
                log::debug!("{}", input::describe(&input, "release"));

                let message = match state.gesture {
                    Gesture::Dragging { node, .. } => Some(CanvasMessage::NodeDragEnded { node }),
                    Gesture::Panning { .. } => Some(CanvasMessage::EndPan),
                    Gesture::Idle => None,
                };
                state.gesture = Gesture::Idle;
                message.map(canvas::Action::publish)
            }
            iced::Event::Mouse(mouse_event) => {
                let position = cursor.position_in(bounds)?;
                match mouse_event {
                    mouse::Event::ButtonPressed(button) => {
                        let input = Input::Button {
                            button: *button,
                            modifiers: state.modifiers,
                        };
                        let descriptor = input::describe(&input, "click");
                        log::debug!("{descriptor}");

                        if let Some(command) = input::resolve(&self.bindings, &descriptor) {
                            return publish(CanvasMessage::Command(command));
                        }
                        self.press(state, &descriptor, position)
                            .map(canvas::Action::publish)
                    }
                    mouse::Event::CursorMoved { .. } => match state.gesture {
                        Gesture::Dragging { node, grab } => {
                            let under = self.view.screen_to_scene(position);
                            publish(CanvasMessage::NodeDragged {
                                node,
                                proposed: Point::new(under.x - grab.x, under.y - grab.y),
                            })
                        }
                        Gesture::Panning { last } => {
                            state.gesture = Gesture::Panning { last: position };
                            publish(CanvasMessage::Pan(Vector::new(
                                position.x - last.x,
                                position.y - last.y,
                            )))
                        }
                        Gesture::Idle => None,
                    },
                    mouse::Event::WheelScrolled { delta } => {
                        let delta = match delta {
                            mouse::ScrollDelta::Lines { x, y } => Vector::new(x * SCROLL_LINE, y * SCROLL_LINE),
                            mouse::ScrollDelta::Pixels { x, y } => Vector::new(*x, *y),
                        };
                        let input = Input::Wheel {
                            delta,
                            modifiers: state.modifiers,
                        };
                        let descriptor = input::describe(&input, "scroll");
                        if let Some(command) = input::resolve(&self.bindings, &descriptor) {
                            return publish(CanvasMessage::Command(command));
                        }
                        publish(CanvasMessage::Wheel {
                            delta,
                            modifiers: state.modifiers,
                            anchor: position,
                        })
                    }
                    _ => None,
                }
            }
            iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { key, modifiers, .. }) => {
                use iced::keyboard::Key;
                use iced::keyboard::key::Named;

                if modifiers.control() || modifiers.alt() {
                    return None;
                }
                let command = match key.as_ref() {
                    Key::Character("+") | Key::Character("=") => Command::ZoomIn,
                    Key::Character("-") => Command::ZoomOut,
                    Key::Character("0") => Command::ZoomReset,
                    Key::Character("f") | Key::Character("F") => Command::ZoomToFit,
                    Key::Character("h") | Key::Character("H") => Command::CenterOrigin,
                    Key::Named(Named::Delete) => Command::DeleteSelection,
                    _ => return None,
                };
                publish(CanvasMessage::Command(command))
            }
            _ => None,
        }
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let Some(position) = cursor.position_in(bounds) else {
            return mouse::Interaction::default();
        };
        match state.gesture {
            Gesture::Dragging { .. } => mouse::Interaction::Grabbing,
            Gesture::Panning { .. } => CursorKind::ClosedHand.interaction(),
            Gesture::Idle => match self.hit_at(position) {
                Hit::Node(_) => mouse::Interaction::Grab,
                Hit::Edge(_) | Hit::None => self.view.cursor().interaction(),
            },
        }
    }
}

/// Grid lines covering `visible`, drawn minor to axis with constant screen widths.
fn draw_grid(frame: &mut Frame, scene: &Scene, visible: Rectangle, zoom: f32) {
    let lines = scene.grid().lines_visible_in(visible);
    for (level, bin) in lines.in_paint_order() {
        let stroke = Stroke::default()
            .with_color(level.color())
            .with_width(level.width() / zoom);
        for line in bin {
            frame.stroke(&Path::line(line.from, line.to), stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{Edge, Endpoint};
    use crate::node::{Node, Socket};

    fn canvas() -> Canvas {
        Canvas::new(&Config::default())
    }

    #[test]
    fn canvas_pairs_scene_and_view() {
        let canvas = canvas();
        assert_eq!(canvas.scene().node_count(), 0);
        assert_eq!(canvas.view().zoom(), 1.0);
        assert_eq!(canvas.scene().grid().minor(), 20);
        assert_eq!(canvas.scene().snap_increment(), 10.0);
    }

    #[test]
    fn drag_messages_go_through_placement() {
        let mut canvas = canvas();
        let node = canvas
            .scene_mut()
            .add_node(Node::action(Point::ORIGIN, "step"));

        canvas.update(CanvasMessage::NodeDragged {
            node,
            proposed: Point::new(33.0, 47.0),
        });
        assert_eq!(canvas.scene().node(node).map(|n| n.center()), Some(Point::new(30.0, 50.0)));
    }

    #[test]
    fn wheel_without_ctrl_scrolls_the_view() {
        let mut canvas = canvas();
        let before = canvas.view().transform().translation;
        canvas.update(CanvasMessage::Wheel {
            delta: Vector::new(0.0, -40.0),
            modifiers: Modifiers::empty(),
            anchor: Point::ORIGIN,
        });
        assert_eq!(canvas.view().zoom(), 1.0);
        assert_eq!(canvas.view().transform().translation, before + Vector::new(0.0, -40.0));

        canvas.update(CanvasMessage::Wheel {
            delta: Vector::new(0.0, 40.0),
            modifiers: Modifiers::CTRL,
            anchor: Point::ORIGIN,
        });
        assert_eq!(canvas.view().zoom(), 1.25);
    }

    #[test]
    fn pan_sets_and_clears_closed_hand() {
        let mut canvas = canvas();
        let node = canvas
            .scene_mut()
            .add_node(Node::action(Point::ORIGIN, "step"));
        canvas.update(CanvasMessage::Select {
            node,
            additive: false,
        });

        canvas.update(CanvasMessage::BeginPan {
            clear_selection: true,
        });
        assert_eq!(canvas.view().cursor(), CursorKind::ClosedHand);
        assert!(!canvas.scene().is_selected(node));

        canvas.update(CanvasMessage::EndPan);
        assert_eq!(canvas.view().cursor(), CursorKind::Normal);
    }

    #[test]
    fn delete_command_spares_triggers() {
        let mut canvas = canvas();
        let scene = canvas.scene_mut();
        let start = scene.add_node(Node::trigger(Point::ORIGIN, "start"));
        let step = scene.add_node(Node::action(Point::new(0.0, 100.0), "step"));
        scene
            .add_edge(Edge::new(
                Endpoint::new(start, Socket::Bottom),
                Endpoint::new(step, Socket::Top),
            ))
            .unwrap();
        scene.select(start, false).unwrap();
        scene.select(step, true).unwrap();

        canvas.run(Command::DeleteSelection);
        assert!(canvas.scene().node(start).is_some());
        assert!(canvas.scene().node(step).is_none());
        assert_eq!(canvas.scene().edge_count(), 0);
    }

    #[test]
    fn zoom_to_fit_uses_scene_items() {
        let mut canvas = canvas();
        canvas.run(Command::ZoomToFit);
        assert_eq!(canvas.view().zoom(), 1.0);

        canvas
            .scene_mut()
            .add_node(Node::action(Point::new(1000.0, 1000.0), "far"));
        canvas.run(Command::ZoomToFit);
        assert_eq!(canvas.view().center(), Point::new(1000.0, 1000.0));
    }

    #[test]
    fn pending_fit_waits_for_the_real_size() {
        let mut canvas = canvas();
        canvas
            .scene_mut()
            .add_node(Node::action(Point::new(200.0, 100.0), "step"));
        canvas.zoom_to_fit_when_shown();
        assert_eq!(canvas.view().zoom(), 1.0);

        let size = Size::new(400.0, 300.0);
        canvas.update(CanvasMessage::ViewportResized(size));
        let mut expected = View::new(Config::default().zoom, Config::default().fit_padding);
        expected.set_viewport(size);
        expected.zoom_to_fit(canvas.scene().items_bounding_rect());
        assert_eq!(canvas.view().zoom(), expected.zoom());
        assert_eq!(canvas.view().center(), Point::new(200.0, 100.0));

        // Only the first resize fits
        canvas.run(Command::ZoomIn);
        let zoom = canvas.view().zoom();
        canvas.update(CanvasMessage::ViewportResized(Size::new(500.0, 300.0)));
        assert_eq!(canvas.view().zoom(), zoom);
    }

    #[test]
    fn input_is_handled_while_a_resize_is_pending() {
        let canvas = canvas();
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(800.0, 600.0));
        assert_ne!(bounds.size(), canvas.view().viewport());

        let mut state = Interaction::default();
        let press = iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let action = <Canvas as canvas::Program<CanvasMessage>>::update(
            &canvas,
            &mut state,
            &press,
            bounds,
            mouse::Cursor::Available(Point::new(100.0, 100.0)),
        );
        assert!(action.is_some());
        assert_eq!(state.gesture, Gesture::Panning { last: Point::new(100.0, 100.0) });

        let release = iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left));
        let action = <Canvas as canvas::Program<CanvasMessage>>::update(
            &canvas,
            &mut state,
            &release,
            bounds,
            mouse::Cursor::Unavailable,
        );
        assert!(action.is_some());
        assert_eq!(state.gesture, Gesture::Idle);

        let focus = iced::Event::Window(iced::window::Event::Focused);
        let action = <Canvas as canvas::Program<CanvasMessage>>::update(
            &canvas,
            &mut state,
            &focus,
            bounds,
            mouse::Cursor::Unavailable,
        );
        assert!(action.is_some());
    }

    #[test]
    fn left_click_on_node_starts_drag() {
        let mut canvas = canvas();
        let node = canvas
            .scene_mut()
            .add_node(Node::action(Point::ORIGIN, "step"));
        let screen = canvas.view().scene_to_screen(Point::new(10.0, 5.0));

        let mut state = Interaction::default();
        let message = canvas.press(&mut state, "left-click", screen);
        assert!(matches!(message, Some(CanvasMessage::Select { node: n, additive: false }) if n == node));
        assert_eq!(
            state.gesture,
            Gesture::Dragging {
                node,
                grab: Vector::new(10.0, 5.0)
            }
        );

        let empty = canvas.view().scene_to_screen(Point::new(500.0, 500.0));
        let mut state = Interaction::default();
        let message = canvas.press(&mut state, "left-click", empty);
        assert!(matches!(message, Some(CanvasMessage::BeginPan { clear_selection: true })));
        assert_eq!(state.gesture, Gesture::Panning { last: empty });
    }
}
