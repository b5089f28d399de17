//! Host input adapter - button words to directional presses.
//!
//! The engine never polls hardware. The host reads its controller ABI each
//! frame and hands the current button word to [`ButtonPad`], which
//! edge-detects it against the previous frame so holding a direction yields
//! exactly one press. Repeat behavior, dead zones and analog-to-digital
//! mapping all stay on the host side.

use crate::types::Direction;

bitflags::bitflags! {
    /// Directional button bits as the host maps them from its input ABI.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u32 {
        const UP    = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Buttons::empty()
    }
}

impl Buttons {
    fn bit(direction: Direction) -> Buttons {
        match direction {
            Direction::Up => Buttons::UP,
            Direction::Down => Buttons::DOWN,
            Direction::Left => Buttons::LEFT,
            Direction::Right => Buttons::RIGHT,
        }
    }
}

/// Press-edge detector over per-frame button snapshots.
#[derive(Debug, Default)]
pub struct ButtonPad {
    held: Buttons,
}

impl ButtonPad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare this frame's snapshot against the last one and return the
    /// directions that were newly pressed, in `Direction::ALL` order.
    pub fn press_edges(&mut self, polled: Buttons) -> Vec<Direction> {
        let pressed = polled & !self.held;
        self.held = polled;
        Direction::ALL
            .into_iter()
            .filter(|&d| pressed.contains(Buttons::bit(d)))
            .collect()
    }
}
