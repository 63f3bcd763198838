//! GPIO / peripheral pin assignments for the pipeline controller board.
//!
//! Single source of truth.  Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

/// Arms the manual route.
pub const BUTTON_MANUAL_GPIO: i32 = 10;
/// Arms the automatic route.
pub const BUTTON_AUTO_GPIO: i32 = 11;
/// Manual level down one step.
pub const BUTTON_DECREASE_GPIO: i32 = 12;
/// Manual level up one step.
pub const BUTTON_INCREASE_GPIO: i32 = 13;

/// Button pins indexed by `Button as usize`.  The index is what the ISR
/// receives as its argument.
pub const BUTTON_GPIOS: [i32; 4] = [
    BUTTON_MANUAL_GPIO,
    BUTTON_AUTO_GPIO,
    BUTTON_DECREASE_GPIO,
    BUTTON_INCREASE_GPIO,
];

// ---------------------------------------------------------------------------
// Analog input (ADC1)
// ---------------------------------------------------------------------------

/// Potentiometer / sensor input.  ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const SIGNAL_ADC_GPIO: i32 = 5;
pub const SIGNAL_ADC_CHANNEL: u32 = 4;

// ---------------------------------------------------------------------------
// PWM output (LEDC)
// ---------------------------------------------------------------------------

/// LED driven by both routes.
pub const LED_PWM_GPIO: i32 = 1;
/// LEDC channel for the LED.
pub const LED_LEDC_CHANNEL: u32 = 0;
/// LEDC timer resolution (bits).  10-bit gives 0 – 1023 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 10;
