use iced::keyboard::Modifiers;
use iced::{Point, Rectangle, Size, Vector, mouse};
use serde::{Deserialize, Serialize};

use crate::input::{self, Input};

pub const DEFAULT_VIEWPORT: Size = Size::new(1200.0, 800.0);

/// Multiplicative zoom step and the open interval the zoom scalar must stay in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub step: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: 1.25,
            min: 0.125,
            max: 8.0,
        }
    }
}

impl ZoomLimits {
    pub fn allows(&self, zoom: f32) -> bool {
        self.min < zoom && zoom < self.max
    }

    /// `zoom` itself when allowed, otherwise the power of `step` nearest to
    /// it that still lies strictly inside the limits.
    pub fn nearest_allowed(&self, zoom: f32) -> f32 {
        if self.allows(zoom) {
            return zoom;
        }
        let too_large = zoom >= self.max;
        let (edge, inward) = if too_large { (self.max, -1) } else { (self.min, 1) };
        let ratio = edge.ln() / self.step.ln();
        let mut exponent = (if too_large { ratio.floor() } else { ratio.ceil() }) as i32;

        // An exact power of the step sits on the boundary; move one step in.
        for _ in 0..MAX_STEPS_INWARD {
            let candidate = self.step.powi(exponent);
            if self.allows(candidate) {
                return candidate;
            }
            exponent += inward;
        }
        1.0
    }
}

const MAX_STEPS_INWARD: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    #[default]
    Normal,
    Crosshair,
    ClosedHand,
}

impl CursorKind {
    pub fn interaction(self) -> mouse::Interaction {
        match self {
            CursorKind::Normal => mouse::Interaction::default(),
            CursorKind::Crosshair => mouse::Interaction::Crosshair,
            CursorKind::ClosedHand => mouse::Interaction::Grabbing,
        }
    }
}

/// Uniform scale followed by a translation: `screen = scene * scale + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub translation: Vector,
}

impl Transform {
    pub fn map(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.scale + self.translation.x,
            scene.y * self.scale + self.translation.y,
        )
    }

    pub fn invert(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translation.x) / self.scale,
            (screen.y - self.translation.y) / self.scale,
        )
    }
}

/// Where a wheel event ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelRoute {
    /// Ctrl was held; `committed` is false when the zoom was out of range.
    Zoom { committed: bool },
    /// Not a zoom gesture; the host should scroll by this screen delta.
    Scroll(Vector),
}

/// Zoomable, pannable window onto a scene.
#[derive(Debug, Clone)]
pub struct View {
    transform: Transform,
    limits: ZoomLimits,
    fit_padding: f32,
    viewport: Size,
    cursor: CursorKind,
}

impl View {
    /// A view at zoom 1.0 with the scene origin in the middle of the viewport.
    pub fn new(limits: ZoomLimits, fit_padding: f32) -> Self {
        let mut view = Self {
            transform: Transform {
                scale: 1.0,
                translation: Vector::ZERO,
            },
            limits,
            fit_padding,
            viewport: DEFAULT_VIEWPORT,
            cursor: CursorKind::Normal,
        };
        view.center_on(Point::ORIGIN);
        view
    }

    /// Current zoom scalar, read back from the transform.
    pub fn zoom(&self) -> f32 {
        self.transform.scale
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport, keeping the scene point at its center in place.
    pub fn set_viewport(&mut self, size: Size) {
        let center = self.center();
        self.viewport = size;
        self.center_on(center);
    }

    pub fn cursor(&self) -> CursorKind {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursor = cursor;
    }

    pub fn screen_to_scene(&self, screen: Point) -> Point {
        self.transform.invert(screen)
    }

    pub fn scene_to_screen(&self, scene: Point) -> Point {
        self.transform.map(scene)
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Scene point shown at the middle of the viewport.
    pub fn center(&self) -> Point {
        self.screen_to_scene(self.viewport_center())
    }

    /// The part of the scene currently on screen.
    pub fn visible_scene_rect(&self) -> Rectangle {
        let top_left = self.screen_to_scene(Point::ORIGIN);
        let scale = self.transform.scale;
        Rectangle::new(
            top_left,
            Size::new(self.viewport.width / scale, self.viewport.height / scale),
        )
    }

    pub fn center_on(&mut self, scene: Point) {
        let screen = self.viewport_center();
        let scale = self.transform.scale;
        self.transform.translation = Vector::new(screen.x - scene.x * scale, screen.y - scene.y * scale);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vector) {
        self.transform.translation = self.transform.translation + delta;
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_in_at(self.viewport_center())
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_out_at(self.viewport_center())
    }

    pub fn zoom_in_at(&mut self, anchor: Point) -> bool {
        self.zoom_by_factor(self.limits.step, anchor)
    }

    pub fn zoom_out_at(&mut self, anchor: Point) -> bool {
        self.zoom_by_factor(1.0 / self.limits.step, anchor)
    }

    /// Scale by `factor` around the screen point `anchor`.
    ///
    /// Commits only if the resulting scalar stays strictly inside the limits;
    /// otherwise nothing changes and `false` is returned.
    pub fn zoom_by_factor(&mut self, factor: f32, anchor: Point) -> bool {
        let proposed = self.transform.scale * factor;
        if !self.limits.allows(proposed) {
            log::trace!("Zoom to {proposed} rejected, outside {:?}", self.limits);
            return false;
        }
        self.rescale(proposed, anchor);
        true
    }

    /// Back to a scale of exactly 1.0, keeping the view centered where it was.
    pub fn zoom_reset(&mut self) {
        let anchor = self.viewport_center();
        self.rescale(1.0, anchor);
    }

    /// Fit `items` (plus padding) into the viewport and center it.
    ///
    /// A fitted scalar outside the zoom limits is replaced by the nearest
    /// reachable step inside them, so the result always satisfies
    /// [`ZoomLimits::allows`]. Returns `false` and leaves the view alone when
    /// there is nothing to fit.
    pub fn zoom_to_fit(&mut self, items: Option<Rectangle>) -> bool {
        let Some(items) = items else {
            return false;
        };
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return false;
        }

        let width = (items.width + 2.0 * self.fit_padding).max(f32::EPSILON);
        let height = (items.height + 2.0 * self.fit_padding).max(f32::EPSILON);
        let fitted = (self.viewport.width / width).min(self.viewport.height / height);
        let scale = self.limits.nearest_allowed(fitted);
        if scale != fitted {
            log::trace!("Fit zoom {fitted} outside {:?}, using {scale}", self.limits);
        }

        self.transform.scale = scale;
        self.center_on(items.center());
        true
    }

    fn rescale(&mut self, scale: f32, anchor: Point) {
        let fixed = self.screen_to_scene(anchor);
        self.transform.scale = scale;
        self.transform.translation = Vector::new(anchor.x - fixed.x * scale, anchor.y - fixed.y * scale);
    }

    /// Ctrl+wheel zooms around `anchor` by vertical direction; anything else is
    /// handed back as a scroll.
    pub fn route_wheel(&mut self, delta: Vector, modifiers: Modifiers, anchor: Point) -> WheelRoute {
        log::trace!(
            "{}",
            input::describe(&Input::Wheel { delta, modifiers }, "scroll")
        );

        if modifiers.control() && delta.y != 0.0 {
            let committed = if delta.y > 0.0 {
                self.zoom_in_at(anchor)
            } else {
                self.zoom_out_at(anchor)
            };
            WheelRoute::Zoom { committed }
        } else {
            WheelRoute::Scroll(delta)
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new(ZoomLimits::default(), 0.0)
    }
}
