//! Canonical descriptions of pointer and wheel input.
//!
//! Every press, release or scroll is reduced to a single discriminator string
//! such as `"ctrl-shift-left-click"` or `"ctrl-up-scroll"`, so dispatch code can
//! compare one value instead of branching over every modifier and button.

use iced::keyboard::Modifiers;
use iced::{Vector, mouse};
use serde::{Deserialize, Serialize};

/// A raw input event as seen by the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Button {
        button: mouse::Button,
        modifiers: Modifiers,
    },
    Wheel {
        delta: Vector,
        modifiers: Modifiers,
    },
}

impl Input {
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Input::Button { modifiers, .. } | Input::Wheel { modifiers, .. } => *modifiers,
        }
    }
}

/// Build the discriminator string for `input`, with `suffix` appended verbatim.
///
/// Modifiers always come first in the order ctrl, alt, shift. Wheel input
/// contributes `up-`/`down-` for the vertical axis followed by `left-`/`right-`
/// for the horizontal axis. Buttons contribute exactly one token; buttons
/// outside the known set become `unknown-` and are reported as a warning.
pub fn describe(input: &Input, suffix: &str) -> String {
    let modifiers = input.modifiers();
    let mut action = String::new();

    if modifiers.control() {
        action.push_str("ctrl-");
    }
    if modifiers.alt() {
        action.push_str("alt-");
    }
    if modifiers.shift() {
        action.push_str("shift-");
    }

    match input {
        Input::Wheel { delta, .. } => {
            if delta.y > 0.0 {
                action.push_str("up-");
            } else if delta.y < 0.0 {
                action.push_str("down-");
            }
            if delta.x > 0.0 {
                action.push_str("left-");
            } else if delta.x < 0.0 {
                action.push_str("right-");
            }
        }
        Input::Button { button, .. } => action.push_str(button_token(*button)),
    }

    action.push_str(suffix);
    action
}

fn button_token(button: mouse::Button) -> &'static str {
    match button {
        mouse::Button::Right => "right-",
        mouse::Button::Middle => "middle-",
        mouse::Button::Back => "back-",
        mouse::Button::Forward => "forward-",
        mouse::Button::Left => "left-",
        mouse::Button::Other(code) => {
            log::warn!("Unknown pointer button: {code}");
            "unknown-"
        }
    }
}

/// Canvas commands that a gesture binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ZoomToFit,
    CenterOrigin,
    DeleteSelection,
}

/// Maps a discriminator string (or a pattern over it) to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub gesture: String,
    #[serde(default)]
    pub use_regex: bool,
    pub command: Command,
}

impl Binding {
    pub fn new(gesture: impl Into<String>, command: Command) -> Self {
        Self {
            gesture: gesture.into(),
            use_regex: false,
            command,
        }
    }

    pub fn pattern(pattern: impl Into<String>, command: Command) -> Self {
        Self {
            gesture: pattern.into(),
            use_regex: true,
            command,
        }
    }

    /// Check if this binding matches a discriminator string
    pub fn matches(&self, descriptor: &str) -> bool {
        if self.use_regex {
            regex::Regex::new(&self.gesture)
                .map(|re| re.is_match(descriptor))
                .unwrap_or(false)
        } else {
            self.gesture == descriptor
        }
    }
}

/// First binding in `bindings` that matches `descriptor`.
pub fn resolve(bindings: &[Binding], descriptor: &str) -> Option<Command> {
    bindings
        .iter()
        .find(|binding| binding.matches(descriptor))
        .map(|binding| binding.command)
}
