use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::keyboard::KeyCode;

use crate::animation::{AnimationController, FrameScheduler};
use crate::sim::SimulationPort;

/// Binds user input to the animation controller and the simulation
/// port: play/pause, the ticks-per-frame entry, reset/randomize, and
/// click-to-toggle. Tracks the cursor and the entry buffer; everything
/// else it operates on is passed in.
pub struct InteractionController {
    cursor: PhysicalPosition<f64>,
    entry: Option<String>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            cursor: PhysicalPosition::new(0.0, 0.0),
            entry: None,
        }
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = position;
    }

    /// Text of the ticks-per-frame entry while it is being edited.
    pub fn entry_text(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Handle a pressed key. Returns true when the surface must be
    /// repainted immediately.
    pub fn key_pressed<S: SimulationPort>(
        &mut self,
        key: KeyCode,
        anim: &mut AnimationController<S>,
        scheduler: &mut impl FrameScheduler,
    ) -> bool {
        if self.entry.is_some() {
            // The entry is re-parsed on every edit; an emptied or
            // unparsable buffer stalls the advance loop until a valid
            // value arrives.
            match key {
                KeyCode::Enter | KeyCode::KeyT => {
                    self.entry = None;
                }
                KeyCode::Backspace => {
                    if let Some(entry) = self.entry.as_mut() {
                        entry.pop();
                        anim.set_ticks_per_frame(parse_ticks(entry));
                    }
                }
                _ => {
                    if let (Some(digit), Some(entry)) = (digit_char(key), self.entry.as_mut()) {
                        entry.push(digit);
                        anim.set_ticks_per_frame(parse_ticks(entry));
                    }
                }
            }
            return false;
        }

        match key {
            KeyCode::Space => {
                if anim.is_running() {
                    anim.stop(scheduler);
                } else {
                    anim.start(scheduler);
                }
            }
            KeyCode::KeyT => {
                // Open the entry prefilled with the current value; the
                // value only changes once the user edits.
                let text = anim
                    .ticks_per_frame()
                    .map(|t| t.to_string())
                    .unwrap_or_default();
                self.entry = Some(text);
            }
            KeyCode::KeyR => {
                // No forced redraw: while paused, the stale grid stays
                // visible until the next frame or pointer event.
                anim.sim_mut().reset();
                log::info!("grid reset");
            }
            KeyCode::KeyN => {
                anim.sim_mut().randomize();
                log::info!("grid randomized");
            }
            _ => {}
        }
        false
    }

    /// Toggle the cell under the cursor and request an immediate
    /// repaint, independent of the animation cadence.
    pub fn click<S: SimulationPort>(
        &mut self,
        surface: PhysicalSize<u32>,
        frame_size: (u32, u32),
        cell_size: u32,
        anim: &mut AnimationController<S>,
    ) -> bool {
        let (width, height) = (anim.sim().width(), anim.sim().height());
        let (row, col) = cell_at(self.cursor, surface, frame_size, cell_size, width, height);
        anim.sim_mut().toggle(row, col);
        log::debug!("toggled cell ({}, {})", row, col);
        true
    }
}

/// Map a cursor position in surface pixels to a clamped (row, col).
///
/// The backing store has a fixed size while the presented surface can
/// be scaled by the window system, so the position is first rescaled
/// into backing-store pixels, then divided by the cell pitch.
pub fn cell_at(
    position: PhysicalPosition<f64>,
    surface: PhysicalSize<u32>,
    frame_size: (u32, u32),
    cell_size: u32,
    width: u32,
    height: u32,
) -> (u32, u32) {
    let scale_x = frame_size.0 as f64 / surface.width.max(1) as f64;
    let scale_y = frame_size.1 as f64 / surface.height.max(1) as f64;
    let x = position.x * scale_x;
    let y = position.y * scale_y;

    let pitch = f64::from(cell_size + 1);
    let row = ((y / pitch) as u32).min(height - 1);
    let col = ((x / pitch) as u32).min(width - 1);
    (row, col)
}

/// Parse the entry buffer. `None` marks the degraded state where the
/// text is not a number; the frame loop then runs zero advances.
pub fn parse_ticks(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

fn digit_char(key: KeyCode) -> Option<char> {
    Some(match key {
        KeyCode::Digit0 => '0',
        KeyCode::Digit1 => '1',
        KeyCode::Digit2 => '2',
        KeyCode::Digit3 => '3',
        KeyCode::Digit4 => '4',
        KeyCode::Digit5 => '5',
        KeyCode::Digit6 => '6',
        KeyCode::Digit7 => '7',
        KeyCode::Digit8 => '8',
        KeyCode::Digit9 => '9',
        _ => return None,
    })
}
