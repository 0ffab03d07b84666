//! S32K3X8 memory map as the evaluation board wires it.
//!
//! ```text
//! Region      Base         Size        Kind
//! ─────────── ──────────── ─────────── ─────────────────────────
//! flash       0x00000000   12 MB       program flash (ROM)
//! sram        0x20400000   2.25 MB     SRAM, overlaid at prio 0
//! lpuart0     0x4006A000   4 KB        UART MMIO aperture
//! pit0        0x40037000   4 KB        periodic timer 0 MMIO
//! pit1        0x40038000   4 KB        periodic timer 1 MMIO
//! ```
//!
//! The SRAM block is mapped as an overlay subregion (priority 0) rather than
//! a plain subregion, matching how the board attaches it to system memory.

/// Program flash — 12 MB at the bottom of the address space.
pub mod flash {
    /// Base address.
    pub const BASE: u64 = 0x0000_0000;
    /// Size in bytes (12 MB).
    pub const SIZE: u64 = 0x00C0_0000;
}

/// SRAM — 2.25 MB, attached as a priority-0 overlay.
pub mod sram {
    /// Base address.
    pub const BASE: u64 = 0x2040_0000;
    /// Size in bytes (2.25 MB).
    pub const SIZE: u64 = 0x0024_0000;
    /// Overlay priority within system memory.
    pub const PRIORITY: i32 = 0;
}

/// LPUART0 MMIO aperture.
pub mod lpuart0 {
    /// Base address.
    pub const BASE: u64 = 0x4006_A000;
    /// Aperture size in bytes.
    pub const SIZE: u64 = 0x1000;
}

/// Periodic interrupt timer 0 MMIO aperture.
pub mod pit0 {
    /// Base address.
    pub const BASE: u64 = 0x4003_7000;
    /// Aperture size in bytes.
    pub const SIZE: u64 = 0x1000;
}

/// Periodic interrupt timer 1 MMIO aperture.
pub mod pit1 {
    /// Base address.
    pub const BASE: u64 = 0x4003_8000;
    /// Aperture size in bytes.
    pub const SIZE: u64 = 0x1000;
}

/// A named span in the board memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Base address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
}

impl Span {
    /// One-past-the-end address.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.base + self.size
    }

    /// Whether `addr` falls inside this span.
    #[must_use]
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }
}

/// Flash span.
pub const FLASH: Span = Span { base: flash::BASE, size: flash::SIZE };
/// SRAM span.
pub const SRAM: Span = Span { base: sram::BASE, size: sram::SIZE };
