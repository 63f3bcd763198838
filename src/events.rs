//! Interrupt-driven button press flags.
//!
//! Each physical button has one lock-free flag.  The GPIO ISR raises it;
//! the stage that owns the button consumes it with an atomic swap, so a
//! press is observed exactly once and stage logic never runs in interrupt
//! context.
//!
//! ```text
//! ┌─────────────┐  raise()   ┌──────────────┐  take_press()  ┌──────────────┐
//! │ GPIO ISR ×4 │──────────▶│  EdgeFlags   │──────────────▶│ Head / Manual │
//! │ (producer)  │           │ [AtomicBool] │               │ (consumer)    │
//! └─────────────┘           └──────────────┘               └──────────────┘
//! ```
//!
//! | Button         | Owning stage |
//! |----------------|--------------|
//! | `ManualSelect` | head         |
//! | `AutoSelect`   | head         |
//! | `Decrease`     | manual       |
//! | `Increase`     | manual       |

use core::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::InputSource;

/// The four physical controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    /// Arm the manual route.
    ManualSelect = 0,
    /// Arm the automatic route.
    AutoSelect = 1,
    /// Lower the manual level by one step.
    Decrease = 2,
    /// Raise the manual level by one step.
    Increase = 3,
}

impl Button {
    pub const COUNT: usize = 4;

    pub const ALL: [Button; Self::COUNT] = [
        Self::ManualSelect,
        Self::AutoSelect,
        Self::Decrease,
        Self::Increase,
    ];

    /// Inverse of `as usize`; the ISR receives the index as its argument.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// One single-writer/single-reader press flag per button.
pub struct EdgeFlags {
    pressed: [AtomicBool; Button::COUNT],
}

impl EdgeFlags {
    pub const fn new() -> Self {
        Self {
            pressed: [
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ],
        }
    }

    /// Record a press.  Lock-free, so safe to call from interrupt context.
    /// Presses between two consumptions collapse into one.
    pub fn raise(&self, button: Button) {
        self.pressed[button as usize].store(true, Ordering::Release);
    }

    /// Peek without consuming.
    pub fn is_raised(&self, button: Button) -> bool {
        self.pressed[button as usize].load(Ordering::Acquire)
    }
}

impl Default for EdgeFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for EdgeFlags {
    fn take_press(&self, button: Button) -> bool {
        self.pressed[button as usize].swap(false, Ordering::AcqRel)
    }
}

/// Flags written by the board's GPIO ISRs.
pub static PRESS_FLAGS: EdgeFlags = EdgeFlags::new();

/// ISR handler.  The per-pin callback passes the button index as argument.
#[allow(unused)]
pub fn press_isr_handler(idx: usize) {
    if let Some(button) = Button::from_index(idx) {
        PRESS_FLAGS.raise(button);
    }
}
