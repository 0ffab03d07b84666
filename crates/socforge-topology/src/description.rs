//! Declarative board description: the input the assembler consumes.
//!
//! The description is a pure value: written in code or deserialized from
//! TOML. The firmware byte blob is not part of it; the image is handed to
//! the assembler next to the description, keeping the description
//! serializable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::ClockRate;
use crate::device::{MemoryLink, PropValue};
use crate::space::RegionKind;

/// Static description of one board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDescription {
    /// Board name.
    pub name: String,
    /// Memory regions to allocate, in order.
    #[serde(default)]
    pub regions: Vec<RegionDesc>,
    /// Clock nodes to declare, in order.
    #[serde(default)]
    pub clocks: Vec<ClockDesc>,
    /// Devices to instantiate; realization follows this order.
    #[serde(default)]
    pub devices: Vec<DeviceDesc>,
    /// Interrupt routes to wire after realization.
    #[serde(default)]
    pub routes: Vec<RouteDesc>,
    /// Firmware load target, if the board boots from an image.
    #[serde(default)]
    pub firmware: Option<FirmwareDesc>,
}

/// One memory region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDesc {
    /// Region id.
    pub id: String,
    /// Base address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
    /// Storage kind.
    pub kind: RegionKind,
    /// Overlay priority (overlays only).
    #[serde(default)]
    pub priority: i32,
}

/// One clock node. A node without `upstream` is a root and needs `rate`;
/// a derived node needs either a fixed `rate` or an integer `ratio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockDesc {
    /// Clock id.
    pub id: String,
    /// Upstream node for derived clocks.
    #[serde(default)]
    pub upstream: Option<String>,
    /// Authoritative rate (root) or fixed derived rate.
    #[serde(default)]
    pub rate: Option<ClockRate>,
    /// `(num, den)` ratio of the upstream frequency.
    #[serde(default)]
    pub ratio: Option<(u32, u32)>,
}

/// One device instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDesc {
    /// Device id.
    pub id: String,
    /// Type tag from the contract table.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Properties to set before realization.
    #[serde(default)]
    pub properties: BTreeMap<String, PropValue>,
    /// Clock input bindings: input name → clock id.
    #[serde(default)]
    pub clocks: BTreeMap<String, String>,
    /// Memory link bindings: input name → target.
    #[serde(default)]
    pub memory: BTreeMap<String, MemoryLink>,
}

/// One interrupt route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDesc {
    /// Source device id.
    pub device: String,
    /// Output index on the source device.
    pub output: u32,
    /// Controller input line.
    pub line: u32,
}

/// Firmware load target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareDesc {
    /// Target region id.
    pub region: String,
    /// Load offset within the region.
    #[serde(default)]
    pub offset: u64,
}
