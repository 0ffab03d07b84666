//! Board identity and the reference device inventory.

/// Machine name the board registers under.
pub const NAME: &str = "s32k3x8evb";
/// Human-readable description.
pub const DESCRIPTION: &str = "NXP S32K3X8 EVB (Cortex-M7)";
/// CPU type the interrupt controller is configured for.
pub const CPU_TYPE: &str = "cortex-m7";

/// Devices the reference board instantiates.
///
/// | Id | Type |
/// |----|------|
/// | `sys` | `sys-controller` |
/// | `nvic` | `interrupt-controller` |
/// | `uart0` | `uart` |
/// | `pit0` | `timer` |
/// | `pit1` | `timer` |
pub const DEVICE_COUNT: usize = 5;
