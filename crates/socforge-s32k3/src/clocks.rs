//! Clock rates the board programs at bring-up.
//!
//! The system clock is authoritative in the period domain (the board sets a
//! 40.69 ns period, ≈ 24.576 MHz); the reference clock is authoritative in
//! the frequency domain (1 MHz).

/// System clock id.
pub const SYSCLK: &str = "sysclk";
/// System clock period in nanoseconds.
pub const SYSCLK_PERIOD_NS: f64 = 40.69;
/// Nominal system clock frequency in Hz (reciprocal of the period, rounded
/// to the part's nominal 24.576 MHz).
pub const SYSCLK_NOMINAL_HZ: u64 = 24_576_000;

/// Reference clock id.
pub const REFCLK: &str = "refclk";
/// Reference clock frequency in Hz.
pub const REFCLK_HZ: f64 = 1_000_000.0;
/// Reference clock period in nanoseconds.
pub const REFCLK_PERIOD_NS: f64 = 1_000.0;
