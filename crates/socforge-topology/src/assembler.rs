//! Board assembler: one deterministic build from description to topology.
//!
//! Phases run in strict order: allocate regions → freeze the address space
//! → build and resolve clocks → declare and configure devices → realize in
//! description order → route interrupts → stage firmware. The first
//! failure aborts the whole build; no partial topology is ever returned.

use crate::clock::{ClockGraph, Derivation};
use crate::description::{BoardDescription, ClockDesc};
use crate::device::DeviceRegistry;
use crate::error::{BuildError, BuildPhase, Result, TopologyError};
use crate::fabric::InterruptFabric;
use crate::firmware::{FirmwareImage, FirmwareLoader, LoadRecord};
use crate::space::{AddressSpace, Region};
use crate::topology::Topology;

/// Assembles board descriptions into realized topologies.
///
/// Stateless: every [`build`](Self::build) call owns a fresh topology, and
/// independent boards never share an address space, clock graph or device
/// registry.
#[derive(Debug)]
pub struct BoardAssembler;

impl BoardAssembler {
    /// Build `description` into a realized [`Topology`].
    ///
    /// `firmware` supplies the byte source for the description's firmware
    /// reference, when it has one.
    ///
    /// # Errors
    ///
    /// The [`BuildError`] names the phase that aborted the build and the
    /// underlying [`TopologyError`] kind.
    pub fn build(
        description: &BoardDescription,
        firmware: Option<&FirmwareImage>,
    ) -> std::result::Result<Topology, BuildError> {
        tracing::info!(board = %description.name, "building board topology");

        let space = Self::allocate_regions(description)
            .map_err(|e| BuildError::new(BuildPhase::Regions, e))?;

        let (clocks, resolved) = Self::build_clocks(description)
            .map_err(|e| BuildError::new(BuildPhase::Clocks, e))?;
        let mut clocks = clocks;

        let mut registry = Self::configure_devices(description)
            .map_err(|e| BuildError::new(BuildPhase::Devices, e))?;

        Self::realize_devices(description, &mut registry, &space, &mut clocks)
            .map_err(|e| BuildError::new(BuildPhase::Realize, e))?;

        let fabric = Self::route_interrupts(description, &registry)
            .map_err(|e| BuildError::new(BuildPhase::Interrupts, e))?;

        let record = Self::stage_firmware(description, firmware, &space)
            .map_err(|e| BuildError::new(BuildPhase::Firmware, e))?;

        tracing::info!(
            board = %description.name,
            devices = registry.realized_count(),
            clocks = resolved.len(),
            "board topology realized"
        );
        Ok(Topology::new(
            description.name.clone(),
            space,
            clocks,
            resolved,
            registry,
            fabric,
            record,
        ))
    }

    fn allocate_regions(description: &BoardDescription) -> Result<AddressSpace> {
        tracing::info!("allocating memory regions");
        let mut space = AddressSpace::new();
        for desc in &description.regions {
            space.add_region(Region::new(
                desc.id.clone(),
                desc.base,
                desc.size,
                desc.kind,
                desc.priority,
            ))?;
        }
        space.freeze();
        Ok(space)
    }

    fn build_clocks(
        description: &BoardDescription,
    ) -> Result<(ClockGraph, std::collections::BTreeMap<String, crate::clock::ResolvedClock>)> {
        tracing::info!("building clock graph");
        let mut clocks = ClockGraph::new();
        for desc in &description.clocks {
            Self::add_clock(&mut clocks, desc)?;
        }
        let resolved = clocks.resolve_all()?;
        Ok((clocks, resolved))
    }

    fn add_clock(clocks: &mut ClockGraph, desc: &ClockDesc) -> Result<()> {
        match (&desc.upstream, desc.rate, desc.ratio) {
            (None, Some(rate), None) => clocks.add_root(&desc.id, rate),
            (Some(upstream), Some(rate), None) => {
                clocks.add_derived(&desc.id, upstream, Derivation::Fixed(rate))
            }
            (Some(upstream), None, Some((num, den))) => {
                clocks.add_derived(&desc.id, upstream, Derivation::Ratio { num, den })
            }
            _ => Err(TopologyError::InvalidClock {
                id: desc.id.clone(),
                reason: "a root takes a rate; a derived clock takes a fixed rate or a ratio".into(),
            }),
        }
    }

    fn configure_devices(description: &BoardDescription) -> Result<DeviceRegistry> {
        tracing::info!("configuring devices");
        let mut registry = DeviceRegistry::new();
        for desc in &description.devices {
            registry.declare(&desc.type_name, &desc.id)?;
            for (key, value) in &desc.properties {
                registry.set_property(&desc.id, key, value.clone())?;
            }
            for (input, clock_id) in &desc.clocks {
                registry.bind_clock(&desc.id, input, clock_id)?;
            }
            for (input, link) in &desc.memory {
                registry.bind_memory(&desc.id, input, link.clone())?;
            }
        }
        Ok(registry)
    }

    fn realize_devices(
        description: &BoardDescription,
        registry: &mut DeviceRegistry,
        space: &AddressSpace,
        clocks: &mut ClockGraph,
    ) -> Result<()> {
        tracing::info!("realizing devices");
        for desc in &description.devices {
            registry.realize(&desc.id, space, clocks)?;
        }
        Ok(())
    }

    fn route_interrupts(
        description: &BoardDescription,
        registry: &DeviceRegistry,
    ) -> Result<Option<InterruptFabric>> {
        let mut controllers = registry.interrupt_controllers();
        let controller = controllers.next();
        if let Some(extra) = controllers.next() {
            return Err(TopologyError::duplicate("interrupt controller", extra.id()));
        }

        let Some(controller) = controller else {
            if description.routes.is_empty() {
                return Ok(None);
            }
            return Err(TopologyError::missing(
                &description.name,
                "device",
                "interrupt-controller",
            ));
        };

        tracing::info!(controller = controller.id(), "routing interrupts");
        let mut fabric = InterruptFabric::attach(registry, controller.id())?;
        for route in &description.routes {
            fabric.route(registry, &route.device, route.output, route.line)?;
        }
        Ok(Some(fabric))
    }

    fn stage_firmware(
        description: &BoardDescription,
        firmware: Option<&FirmwareImage>,
        space: &AddressSpace,
    ) -> Result<Option<LoadRecord>> {
        match (&description.firmware, firmware) {
            (Some(desc), Some(image)) => {
                tracing::info!(region = %desc.region, "staging firmware");
                let loader = FirmwareLoader::new(space);
                Ok(Some(loader.load(image, &desc.region, desc.offset)?))
            }
            (Some(desc), None) => Err(TopologyError::missing(
                "firmware",
                "image",
                desc.region.clone(),
            )),
            (None, Some(image)) => Err(TopologyError::missing(
                "firmware",
                "target region",
                image.source(),
            )),
            (None, None) => Ok(None),
        }
    }
}
