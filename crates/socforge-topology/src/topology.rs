//! Realized topology: the read-only result of a successful build.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::clock::{ClockGraph, ResolvedClock};
use crate::device::DeviceRegistry;
use crate::fabric::InterruptFabric;
use crate::firmware::LoadRecord;
use crate::space::AddressSpace;

/// A fully realized hardware topology.
///
/// Handed to the caller only when every build phase succeeded; there is no
/// partially built variant. All accessors are read-only — the execution
/// core consumes this view, it never mutates it.
#[derive(Debug)]
pub struct Topology {
    name: String,
    space: AddressSpace,
    graph: ClockGraph,
    clocks: BTreeMap<String, ResolvedClock>,
    devices: DeviceRegistry,
    fabric: Option<InterruptFabric>,
    firmware: Option<LoadRecord>,
}

impl Topology {
    pub(crate) fn new(
        name: String,
        space: AddressSpace,
        graph: ClockGraph,
        clocks: BTreeMap<String, ResolvedClock>,
        devices: DeviceRegistry,
        fabric: Option<InterruptFabric>,
        firmware: Option<LoadRecord>,
    ) -> Self {
        Self { name, space, graph, clocks, devices, fabric, firmware }
    }

    /// Board name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The frozen address space.
    #[must_use]
    pub const fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// The frozen clock graph.
    #[must_use]
    pub const fn clock_graph(&self) -> &ClockGraph {
        &self.graph
    }

    /// Resolved rate of one clock.
    #[must_use]
    pub fn clock(&self, id: &str) -> Option<&ResolvedClock> {
        self.clocks.get(id)
    }

    /// All resolved clocks, in id order.
    #[must_use]
    pub const fn clocks(&self) -> &BTreeMap<String, ResolvedClock> {
        &self.clocks
    }

    /// The realized device set.
    #[must_use]
    pub const fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// The interrupt fabric, when the board has a controller.
    #[must_use]
    pub fn fabric(&self) -> Option<&InterruptFabric> {
        self.fabric.as_ref()
    }

    /// The firmware load record, when an image was staged.
    #[must_use]
    pub fn firmware(&self) -> Option<&LoadRecord> {
        self.firmware.as_ref()
    }

    /// Deterministic plain-text summary of the realized topology.
    ///
    /// Identical descriptions build byte-identical summaries.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "board {}", self.name);

        let _ = writeln!(out, "regions:");
        for region in self.space.regions() {
            let _ = write!(
                out,
                "  {:<12} [{:#010x}, {:#010x})  {}",
                region.id(),
                region.base(),
                region.end(),
                region.kind()
            );
            if region.kind() == crate::space::RegionKind::Overlay {
                let _ = write!(out, " prio {}", region.priority());
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "clocks:");
        for (id, clock) in &self.clocks {
            let _ = writeln!(
                out,
                "  {:<12} {:.3} Hz  {:.3} ns",
                id, clock.hz, clock.period_ns
            );
        }

        let _ = writeln!(out, "devices:");
        for device in self.devices.devices() {
            let _ = writeln!(
                out,
                "  {:<12} {:<22} {}",
                device.id(),
                device.type_name(),
                device.state()
            );
        }

        if let Some(fabric) = &self.fabric {
            let _ = writeln!(
                out,
                "interrupts (controller {}, {} lines):",
                fabric.controller(),
                fabric.lines()
            );
            for edge in fabric.edges() {
                let _ = writeln!(out, "  {}.{} -> {}", edge.source, edge.output, edge.line);
            }
        }

        if let Some(record) = &self.firmware {
            let _ = writeln!(
                out,
                "firmware: {} bytes from `{}` -> {} [{:#010x}, {:#010x})",
                record.len(),
                record.source(),
                record.region(),
                record.start(),
                record.end()
            );
        }

        out
    }
}
