#![warn(clippy::pedantic)]

pub mod baker;
pub mod compositor;
pub mod config;
pub mod input;
pub mod snapshot;
pub mod surface;

use baker::Baker;
use compositor::{Compositor, DebugOverlay};
use input::{InputCapture, PointerDevice, PointerEvent, PointerPhase};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use scrawl_core::action::Action;
use scrawl_core::color::Rgba8;
use scrawl_core::model::SketchModel;
use strum::IntoEnumIterator;
use surface::{Pixmap, Surface};
use ultraviolet::Vec2;

/// Demo ink presets, cycled with Tab.
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::EnumIter)]
enum InkPreset {
    Graphite,
    Crimson,
    Ochre,
    Sea,
    Violet,
}

impl InkPreset {
    fn color(self) -> Rgba8 {
        match self {
            Self::Graphite => Rgba8::opaque(20, 20, 24),
            Self::Crimson => Rgba8::opaque(186, 32, 50),
            Self::Ochre => Rgba8::opaque(190, 130, 30),
            Self::Sea => Rgba8::opaque(20, 110, 130),
            Self::Violet => Rgba8::opaque(110, 50, 160),
        }
    }
}

/// Mouse speed stands in for pen pressure: slow deliberate movement
/// presses hard, fast movement glides light.
fn synthetic_pressure(pos: Vec2, last: Option<Vec2>) -> f32 {
    let Some(last) = last else { return 1.0 };
    let speed = (pos - last).mag();
    (1.0 - speed / 60.0).clamp(0.25, 1.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = config::Config::load_or_default();
    let mut model = SketchModel::new();
    model.tool = config.tool();
    model.grid = config.grid;

    let mut window = Window::new(
        "scrawl",
        config.window_width as usize,
        config.window_height as usize,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(120);

    let (width, height) = window.get_size();
    let mut baker = Baker::new(width as u32, height as u32);
    let mut frame = Pixmap::new(width as u32, height as u32);
    let mut capture = InputCapture::new();
    let mut compositor = Compositor::default();

    let mut ink_index = 0usize;
    let mut was_down = false;
    let mut last_contact: Option<Vec2> = None;
    // Device is latched at contact start: one touch is one device, even if
    // the modifier keys faking the device change mid-drag.
    let mut contact_device: Option<PointerDevice> = None;
    let mut snapshots = 0u32;

    log::info!(
        "draw with the mouse; hold E for the eraser tip, Shift for a finger. \
         U/Y undo/redo, C clear, G grid, P pressure, H handwriting, Tab ink, \
         -/= width, O overlays, S snapshot, Esc quit"
    );

    while window.is_open() && !window.is_key_down(Key::Escape) {
        // Viewport first: a resize drops baked ink and the next sync
        // rebuilds, so it must happen before this frame's bake.
        let (new_width, new_height) = window.get_size();
        let (new_width, new_height) = (new_width as u32, new_height as u32);
        if (new_width, new_height) != (frame.width(), frame.height()) {
            baker.resize(new_width, new_height);
            frame = Pixmap::new(new_width, new_height);
        }

        // History keys only land while the pen is up - the model treats
        // history edits under an active stroke as a protocol violation.
        if model.current().is_none() {
            if window.is_key_pressed(Key::U, KeyRepeat::No) {
                model.apply(Action::Undo);
            }
            if window.is_key_pressed(Key::Y, KeyRepeat::No) {
                model.apply(Action::Redo);
            }
            if window.is_key_pressed(Key::C, KeyRepeat::No) {
                model.apply(Action::ClearCanvas);
            }
            // Changing who may draw mid-contact would strand the stroke.
            if window.is_key_pressed(Key::H, KeyRepeat::No) {
                model.apply(Action::ToggleHandwritingMode(!model.tool.handwriting));
            }
        }
        if window.is_key_pressed(Key::G, KeyRepeat::No) {
            model.grid = !model.grid;
        }
        if window.is_key_pressed(Key::P, KeyRepeat::No) {
            model.apply(Action::UpdateTool {
                eraser: model.tool.eraser,
                pressure: !model.tool.pressure,
                width: model.tool.width,
                color: model.tool.color,
            });
        }
        if window.is_key_pressed(Key::Tab, KeyRepeat::No) {
            ink_index = (ink_index + 1) % InkPreset::iter().count();
            let preset = InkPreset::iter().nth(ink_index).unwrap();
            model.apply(Action::SelectColor(preset.color()));
        }
        if window.is_key_pressed(Key::Minus, KeyRepeat::Yes) {
            model.apply(Action::SelectStrokeWidth((model.tool.width - 1.0).max(1.0)));
        }
        if window.is_key_pressed(Key::Equal, KeyRepeat::Yes) {
            model.apply(Action::SelectStrokeWidth((model.tool.width + 1.0).min(64.0)));
        }
        if window.is_key_pressed(Key::O, KeyRepeat::No) {
            compositor.overlay = if compositor.overlay.is_empty() {
                DebugOverlay::CONTROL_POINTS | DebugOverlay::RAW_POINTS
            } else {
                DebugOverlay::empty()
            };
        }
        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            let path = std::path::PathBuf::from(format!("scrawl-{snapshots:03}.png"));
            match snapshot::write_png(&path, &frame) {
                Ok(()) => {
                    log::info!("wrote {}", path.display());
                    snapshots += 1;
                }
                Err(e) => log::error!("snapshot failed: {e:#}"),
            }
        }

        // Mouse traffic becomes pointer events; the capture layer decides
        // what (if anything) the model hears about.
        if let Some((x, y)) = window.get_mouse_pos(MouseMode::Clamp) {
            let pos = Vec2::new(x, y);
            let down = window.get_mouse_down(MouseButton::Left);
            let phase = match (was_down, down) {
                (false, true) => Some(PointerPhase::Down),
                // Suppress stationary move events; they carry no new ink.
                (true, true) if last_contact == Some(pos) => None,
                (true, true) => Some(PointerPhase::Move),
                (true, false) => Some(PointerPhase::Up),
                (false, false) => Some(PointerPhase::Hover),
            };
            if let Some(phase) = phase {
                let keyed_device = if window.is_key_down(Key::E) {
                    PointerDevice::EraserTip
                } else if window.is_key_down(Key::LeftShift) {
                    PointerDevice::Finger
                } else {
                    PointerDevice::Pen
                };
                let device = match phase {
                    PointerPhase::Down => {
                        contact_device = Some(keyed_device);
                        keyed_device
                    }
                    PointerPhase::Move | PointerPhase::Up => {
                        contact_device.unwrap_or(keyed_device)
                    }
                    PointerPhase::Hover => keyed_device,
                };
                if phase == PointerPhase::Up {
                    contact_device = None;
                }
                let pressure = synthetic_pressure(pos, last_contact);
                let event = PointerEvent {
                    pos,
                    pressure: Some(pressure),
                    device,
                    phase,
                };
                for action in capture.translate(&event, &model.tool) {
                    model.apply(action);
                }
            }
            last_contact = if down { Some(pos) } else { None };
            was_down = down;
        }

        baker.sync(&model);
        compositor.render(&mut frame, &model, &baker, capture.hover());
        window.update_with_buffer(
            frame.pixels(),
            frame.width() as usize,
            frame.height() as usize,
        )?;
    }
    Ok(())
}
