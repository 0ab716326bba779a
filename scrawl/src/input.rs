//! # Input capture
//!
//! Translates raw pointer traffic from the shell into model actions. This
//! is the policy layer: which devices may draw, when the eraser tip flips
//! the tool, and how contact phases map onto stroke actions. It owns no
//! drawing state - only the last-seen device (to detect tip transitions)
//! and a transient hover position.

use scrawl_core::action::Action;
use scrawl_core::tool::ToolState;
use smallvec::SmallVec;
use ultraviolet::Vec2;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PointerDevice {
    Pen,
    Finger,
    /// The inverted stylus end.
    EraserTip,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// In range but not touching. Moves the cursor, never the ink.
    Hover,
}

#[derive(Copy, Clone, Debug)]
pub struct PointerEvent {
    pub pos: Vec2,
    /// `None` for devices that do not report pressure; treated as full
    /// pressure.
    pub pressure: Option<f32>,
    pub device: PointerDevice,
    pub phase: PointerPhase,
}

/// One pointer event expands to at most two actions (down and up phases
/// pair a stroke-boundary action with a point), plus possibly a tool flip.
pub type Actions = SmallVec<[Action; 2]>;

#[derive(Default)]
pub struct InputCapture {
    last_device: Option<PointerDevice>,
    hover: Option<Vec2>,
}

impl InputCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Cursor position while the pointer hovers; `None` during contact.
    #[must_use]
    pub fn hover(&self) -> Option<Vec2> {
        self.hover
    }

    /// Classify one event against the current tool and emit the actions it
    /// implies, in dispatch order.
    pub fn translate(&mut self, event: &PointerEvent, tool: &ToolState) -> Actions {
        let mut out = Actions::new();

        // Palm rejection: finger contact is ignored wholesale unless
        // handwriting mode invites it. It must not even steer the cursor.
        if event.device == PointerDevice::Finger && !tool.handwriting {
            return out;
        }

        // Tip transitions flip the eraser exactly once per switch, not
        // once per event. Leaving the eraser tip switches back.
        let entering = event.device == PointerDevice::EraserTip
            && self.last_device != Some(PointerDevice::EraserTip);
        let leaving = event.device != PointerDevice::EraserTip
            && self.last_device == Some(PointerDevice::EraserTip);
        if entering || leaving {
            out.push(Action::UpdateTool {
                eraser: entering,
                pressure: tool.pressure,
                width: tool.width,
                color: tool.color,
            });
        }
        self.last_device = Some(event.device);
        // The flip above has not reached the model yet; act on the state
        // the model will be in once it does.
        let eraser = if entering {
            true
        } else if leaving {
            false
        } else {
            tool.eraser
        };

        match event.phase {
            PointerPhase::Hover => {
                self.hover = Some(event.pos);
                return out;
            }
            PointerPhase::Down | PointerPhase::Move | PointerPhase::Up => {
                self.hover = None;
            }
        }

        if eraser {
            match event.phase {
                PointerPhase::Down | PointerPhase::Move => out.push(Action::Erase(event.pos)),
                // Commit boundary; the model treats it as a no-op.
                PointerPhase::Up => out.push(Action::PathEnd),
                PointerPhase::Hover => unreachable!(),
            }
            return out;
        }

        let draw = Action::Draw {
            pos: event.pos,
            pressure: event.pressure.unwrap_or(1.0),
        };
        match event.phase {
            PointerPhase::Down => {
                out.push(Action::StartPath(tool.color));
                out.push(draw);
            }
            PointerPhase::Move => out.push(draw),
            PointerPhase::Up => {
                out.push(draw);
                out.push(Action::PathEnd);
            }
            PointerPhase::Hover => unreachable!(),
        }
        out
    }
}
