//! Interrupt fabric: routes device IRQ outputs onto controller input lines.
//!
//! Each controller input line is owned by at most one edge. Routing is
//! append-only; edges are never removed or rebound once the build
//! completes. An unrouted device output is legal.

use std::collections::BTreeMap;

use crate::device::{DeviceRegistry, DeviceState, PropValue};
use crate::error::{Result, TopologyError};

/// One routed interrupt edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptEdge {
    /// Source device id.
    pub source: String,
    /// Output index on the source device.
    pub output: u32,
    /// Controller input line the output is routed to.
    pub line: u32,
}

/// Owns the interrupt edges of one topology.
#[derive(Debug)]
pub struct InterruptFabric {
    controller: String,
    lines: u32,
    edges: Vec<InterruptEdge>,
    owners: BTreeMap<u32, String>,
}

impl InterruptFabric {
    /// Attach the fabric to a realized interrupt controller. The input
    /// line count comes from the controller's `num-irq` property.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`; `UnrealizedController` when the controller has not
    /// been realized; `MissingDependency` when `num-irq` is absent or not
    /// an integer.
    pub fn attach(registry: &DeviceRegistry, controller_id: &str) -> Result<Self> {
        let controller = registry.device(controller_id)?;
        if controller.state() != DeviceState::Realized {
            return Err(TopologyError::UnrealizedController {
                controller: controller_id.to_owned(),
            });
        }
        let lines = match controller.property("num-irq") {
            Some(PropValue::U32(n)) => *n,
            _ => return Err(TopologyError::missing(controller_id, "property", "num-irq")),
        };
        tracing::debug!(controller = controller_id, lines, "interrupt fabric attached");
        Ok(Self {
            controller: controller_id.to_owned(),
            lines,
            edges: Vec::new(),
            owners: BTreeMap::new(),
        })
    }

    /// Route one device output onto a controller input line.
    ///
    /// # Errors
    ///
    /// `UnknownDevice` for the source; `UnrealizedController` when the
    /// controller left the `Realized` state; `Ordering` when the source is
    /// not realized; `LineOutOfRange` for an output or line index beyond
    /// the declared width; `DuplicateLine` when the input line is already
    /// owned.
    pub fn route(
        &mut self,
        registry: &DeviceRegistry,
        device_id: &str,
        output: u32,
        line: u32,
    ) -> Result<()> {
        if registry.device(&self.controller)?.state() != DeviceState::Realized {
            return Err(TopologyError::UnrealizedController {
                controller: self.controller.clone(),
            });
        }
        let source = registry.device(device_id)?;
        if source.state() != DeviceState::Realized {
            return Err(TopologyError::Ordering {
                device: device_id.to_owned(),
                dependency: self.controller.clone(),
            });
        }
        if output >= source.irq_outputs() {
            return Err(TopologyError::LineOutOfRange {
                index: output,
                count: source.irq_outputs(),
            });
        }
        if line >= self.lines {
            return Err(TopologyError::LineOutOfRange { index: line, count: self.lines });
        }
        if let Some(owner) = self.owners.get(&line) {
            return Err(TopologyError::DuplicateLine { line, owner: owner.clone() });
        }

        tracing::debug!(source = device_id, output, line, "interrupt edge routed");
        self.owners.insert(line, device_id.to_owned());
        self.edges.push(InterruptEdge {
            source: device_id.to_owned(),
            output,
            line,
        });
        Ok(())
    }

    /// Controller device id.
    #[must_use]
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Controller input line count.
    #[must_use]
    pub const fn lines(&self) -> u32 {
        self.lines
    }

    /// Routed edges, in routing order.
    #[must_use]
    pub fn edges(&self) -> &[InterruptEdge] {
        &self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ClockGraph, ClockRate};
    use crate::device::MemoryLink;
    use crate::space::{AddressSpace, Region};

    fn realized_board() -> (DeviceRegistry, AddressSpace, ClockGraph) {
        let mut space = AddressSpace::new();
        space
            .add_region(Region::ram("uart-mmio", 0x4006_A000, 0x1000))
            .unwrap();
        space
            .add_region(Region::ram("pit-mmio", 0x4003_7000, 0x1000))
            .unwrap();
        space.freeze();

        let mut clocks = ClockGraph::new();
        clocks.add_root("sysclk", ClockRate::PeriodNs(40.69)).unwrap();
        clocks.add_root("refclk", ClockRate::Hz(1e6)).unwrap();

        let mut registry = DeviceRegistry::new();
        registry.declare("interrupt-controller", "nvic").unwrap();
        registry.bind_clock("nvic", "cpuclk", "sysclk").unwrap();
        registry.bind_clock("nvic", "refclk", "refclk").unwrap();
        registry.bind_memory("nvic", "memory", MemoryLink::Space).unwrap();
        registry.set_property("nvic", "num-irq", PropValue::U32(32)).unwrap();
        registry.realize("nvic", &space, &mut clocks).unwrap();

        registry.declare("uart", "uart0").unwrap();
        registry
            .bind_memory("uart0", "mmio", MemoryLink::Region("uart-mmio".into()))
            .unwrap();
        registry
            .bind_memory("uart0", "intc", MemoryLink::Device("nvic".into()))
            .unwrap();
        registry.realize("uart0", &space, &mut clocks).unwrap();

        registry.declare("timer", "pit0").unwrap();
        registry.bind_clock("pit0", "pclk", "sysclk").unwrap();
        registry
            .bind_memory("pit0", "mmio", MemoryLink::Region("pit-mmio".into()))
            .unwrap();
        registry
            .bind_memory("pit0", "intc", MemoryLink::Device("nvic".into()))
            .unwrap();
        registry.realize("pit0", &space, &mut clocks).unwrap();

        (registry, space, clocks)
    }

    #[test]
    fn test_route_and_duplicate_line() {
        let (registry, _, _) = realized_board();
        let mut fabric = InterruptFabric::attach(&registry, "nvic").unwrap();
        fabric.route(&registry, "uart0", 0, 0).unwrap();

        let err = fabric.route(&registry, "pit0", 0, 0).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateLine { line: 0, ref owner } if owner == "uart0"));

        fabric.route(&registry, "pit0", 0, 8).unwrap();
        assert_eq!(fabric.edges().len(), 2);
    }

    #[test]
    fn test_attach_requires_realized_controller() {
        let mut registry = DeviceRegistry::new();
        registry.declare("interrupt-controller", "nvic").unwrap();
        let err = InterruptFabric::attach(&registry, "nvic").unwrap_err();
        assert!(matches!(err, TopologyError::UnrealizedController { .. }));
    }

    #[test]
    fn test_line_out_of_range() {
        let (registry, _, _) = realized_board();
        let mut fabric = InterruptFabric::attach(&registry, "nvic").unwrap();
        let err = fabric.route(&registry, "uart0", 0, 32).unwrap_err();
        assert!(matches!(err, TopologyError::LineOutOfRange { index: 32, count: 32 }));
    }

    #[test]
    fn test_output_out_of_range() {
        let (registry, _, _) = realized_board();
        let mut fabric = InterruptFabric::attach(&registry, "nvic").unwrap();
        let err = fabric.route(&registry, "uart0", 1, 4).unwrap_err();
        assert!(matches!(err, TopologyError::LineOutOfRange { index: 1, count: 1 }));
    }

    #[test]
    fn test_unrouted_output_is_legal() {
        let (registry, _, _) = realized_board();
        let fabric = InterruptFabric::attach(&registry, "nvic").unwrap();
        assert!(fabric.edges().is_empty());
    }
}
