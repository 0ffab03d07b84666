//! Device registry and realization state machine.
//!
//! Devices move forward-only through `Declared → Configured → Realized`,
//! or into `Failed` when realization is rejected. Each device type carries
//! a static contract naming the clock inputs, memory links and properties
//! it cannot realize without; the contract is checked at realize time
//! instead of trusting call-order discipline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::ClockGraph;
use crate::error::{Result, TopologyError};
use crate::space::AddressSpace;

/// Scalar property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Boolean flag.
    Bool(bool),
    /// Unsigned integer.
    U32(u32),
    /// String.
    Str(String),
}

impl std::fmt::Display for PropValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::U32(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Target of a memory link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryLink {
    /// A named region.
    Region(String),
    /// The whole system address space (the controller's `memory` link).
    Space,
    /// Another device. Carries a structural dependency: the target must be
    /// realized first.
    Device(String),
}

/// Static requirement list for one device type.
#[derive(Debug, Clone, Copy)]
pub struct DeviceContract {
    /// Type tag devices of this kind are declared with.
    pub type_name: &'static str,
    /// Clock inputs that must be bound before realize.
    pub required_clocks: &'static [&'static str],
    /// Memory links that must be bound before realize.
    pub required_memory: &'static [&'static str],
    /// Properties that must be set before realize.
    pub required_props: &'static [&'static str],
    /// Interrupt outputs this type drives.
    pub irq_outputs: u32,
    /// Whether this type owns controller input lines.
    pub interrupt_controller: bool,
}

/// Contract table for the supported device types.
pub const CONTRACTS: &[DeviceContract] = &[
    DeviceContract {
        type_name: "interrupt-controller",
        required_clocks: &["cpuclk", "refclk"],
        required_memory: &["memory"],
        required_props: &["num-irq"],
        irq_outputs: 0,
        interrupt_controller: true,
    },
    DeviceContract {
        type_name: "sys-controller",
        required_clocks: &[],
        required_memory: &[],
        required_props: &[],
        irq_outputs: 0,
        interrupt_controller: false,
    },
    DeviceContract {
        type_name: "uart",
        required_clocks: &[],
        required_memory: &["mmio", "intc"],
        required_props: &[],
        irq_outputs: 1,
        interrupt_controller: false,
    },
    DeviceContract {
        type_name: "timer",
        required_clocks: &["pclk"],
        required_memory: &["mmio", "intc"],
        required_props: &[],
        irq_outputs: 1,
        interrupt_controller: false,
    },
];

/// Contract for `type_name`, if it is a supported type.
#[must_use]
pub fn contract(type_name: &str) -> Option<&'static DeviceContract> {
    CONTRACTS.iter().find(|c| c.type_name == type_name)
}

/// Lifecycle state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Declared, nothing bound yet.
    Declared,
    /// At least one binding or property set.
    Configured,
    /// Contract satisfied; bindings frozen. Terminal success.
    Realized,
    /// Realization rejected. Terminal error.
    Failed,
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Declared => "declared",
            Self::Configured => "configured",
            Self::Realized => "realized",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One device instance and its declared links.
#[derive(Debug, Clone)]
pub struct Device {
    id: String,
    contract: &'static DeviceContract,
    properties: BTreeMap<String, PropValue>,
    clock_bindings: BTreeMap<String, String>,
    memory_bindings: BTreeMap<String, MemoryLink>,
    state: DeviceState,
}

impl Device {
    /// Device id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.contract.type_name
    }

    /// Static contract of this device's type.
    #[must_use]
    pub const fn contract(&self) -> &'static DeviceContract {
        self.contract
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> DeviceState {
        self.state
    }

    /// Interrupt outputs this device drives.
    #[must_use]
    pub const fn irq_outputs(&self) -> u32 {
        self.contract.irq_outputs
    }

    /// Property value, if set.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropValue> {
        self.properties.get(key)
    }

    /// Clock bound to `input`, if any.
    #[must_use]
    pub fn clock_binding(&self, input: &str) -> Option<&str> {
        self.clock_bindings.get(input).map(String::as_str)
    }

    /// Memory link bound to `input`, if any.
    #[must_use]
    pub fn memory_binding(&self, input: &str) -> Option<&MemoryLink> {
        self.memory_bindings.get(input)
    }

    fn check_mutable(&self) -> Result<()> {
        match self.state {
            DeviceState::Declared | DeviceState::Configured => Ok(()),
            DeviceState::Realized | DeviceState::Failed => Err(TopologyError::AlreadyRealized {
                device: self.id.clone(),
                state: self.state.to_string(),
            }),
        }
    }
}

/// Owns the device set of one topology.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Device>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a device instance of a supported type.
    ///
    /// # Errors
    ///
    /// `UnknownDeviceType` for a type name outside the contract table;
    /// `Duplicate` for a reused id.
    pub fn declare(&mut self, type_name: &str, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        let contract = contract(type_name).ok_or_else(|| TopologyError::UnknownDeviceType {
            type_name: type_name.to_owned(),
        })?;
        if self.devices.contains_key(&id) {
            return Err(TopologyError::duplicate("device", id));
        }
        tracing::debug!(id = %id, type_name, "declaring device");
        self.devices.insert(
            id.clone(),
            Device {
                id,
                contract,
                properties: BTreeMap::new(),
                clock_bindings: BTreeMap::new(),
                memory_bindings: BTreeMap::new(),
                state: DeviceState::Declared,
            },
        );
        Ok(())
    }

    /// Bind a clock input.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`; `AlreadyRealized` once the device is terminal.
    pub fn bind_clock(&mut self, id: &str, input: &str, clock_id: impl Into<String>) -> Result<()> {
        let dev = self.device_mut(id)?;
        dev.check_mutable()?;
        dev.clock_bindings.insert(input.to_owned(), clock_id.into());
        dev.state = DeviceState::Configured;
        Ok(())
    }

    /// Bind a memory link.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`; `AlreadyRealized` once the device is terminal.
    pub fn bind_memory(&mut self, id: &str, input: &str, link: MemoryLink) -> Result<()> {
        let dev = self.device_mut(id)?;
        dev.check_mutable()?;
        dev.memory_bindings.insert(input.to_owned(), link);
        dev.state = DeviceState::Configured;
        Ok(())
    }

    /// Set a property.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`; `AlreadyRealized` once the device is terminal.
    pub fn set_property(&mut self, id: &str, key: &str, value: PropValue) -> Result<()> {
        let dev = self.device_mut(id)?;
        dev.check_mutable()?;
        dev.properties.insert(key.to_owned(), value);
        dev.state = DeviceState::Configured;
        Ok(())
    }

    /// Realize a device: check its contract and bindings, then freeze it.
    ///
    /// On success the device is `Realized` and, when it binds clocks, the
    /// clock graph freezes on its behalf. On failure the device is parked
    /// in `Failed` and the error is returned.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`; `AlreadyRealized` when not `Declared`/`Configured`;
    /// `MissingDependency` for an unmet contract requirement;
    /// `UnknownClock`/`UnknownRegion` for dangling bindings; `Ordering`
    /// when a linked device is not yet realized.
    pub fn realize(&mut self, id: &str, space: &AddressSpace, clocks: &mut ClockGraph) -> Result<()> {
        {
            let dev = self.device(id)?;
            dev.check_mutable()?;
        }

        let outcome = self.check_realizable(id, space, clocks);
        let binds_clocks = match &outcome {
            Ok(binds_clocks) => *binds_clocks,
            Err(_) => false,
        };

        if let Some(dev) = self.devices.get_mut(id) {
            match &outcome {
                Ok(_) => {
                    dev.state = DeviceState::Realized;
                    tracing::info!(id = %id, type_name = dev.contract.type_name, "device realized");
                }
                Err(err) => {
                    dev.state = DeviceState::Failed;
                    tracing::warn!(id = %id, error = %err, "device realization failed");
                }
            }
        }

        if binds_clocks {
            clocks.freeze(id);
        }
        outcome.map(|_| ())
    }

    /// Device by id.
    ///
    /// # Errors
    ///
    /// `UnknownDevice`.
    pub fn device(&self, id: &str) -> Result<&Device> {
        self.devices
            .get(id)
            .ok_or_else(|| TopologyError::unknown_device(id))
    }

    /// All devices, in id order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of realized devices.
    #[must_use]
    pub fn realized_count(&self) -> usize {
        self.devices
            .values()
            .filter(|d| d.state == DeviceState::Realized)
            .count()
    }

    /// The interrupt-controller devices, in id order.
    pub fn interrupt_controllers(&self) -> impl Iterator<Item = &Device> {
        self.devices
            .values()
            .filter(|d| d.contract.interrupt_controller)
    }

    fn device_mut(&mut self, id: &str) -> Result<&mut Device> {
        self.devices
            .get_mut(id)
            .ok_or_else(|| TopologyError::unknown_device(id))
    }

    /// Contract and binding validation. Returns whether the device binds
    /// any clock (the caller freezes the graph on success).
    fn check_realizable(&self, id: &str, space: &AddressSpace, clocks: &ClockGraph) -> Result<bool> {
        let dev = self.device(id)?;

        for input in dev.contract.required_clocks {
            if !dev.clock_bindings.contains_key(*input) {
                return Err(TopologyError::missing(id, "clock input", *input));
            }
        }
        for input in dev.contract.required_memory {
            if !dev.memory_bindings.contains_key(*input) {
                return Err(TopologyError::missing(id, "memory link", *input));
            }
        }
        for key in dev.contract.required_props {
            if !dev.properties.contains_key(*key) {
                return Err(TopologyError::missing(id, "property", *key));
            }
        }

        for clock_id in dev.clock_bindings.values() {
            if !clocks.contains(clock_id) {
                return Err(TopologyError::unknown_clock(clock_id));
            }
        }

        for link in dev.memory_bindings.values() {
            match link {
                MemoryLink::Space => {}
                MemoryLink::Region(region_id) => {
                    if space.region(region_id).is_none() {
                        return Err(TopologyError::unknown_region(region_id));
                    }
                }
                MemoryLink::Device(target) => {
                    let target_dev = self.device(target)?;
                    if target_dev.state != DeviceState::Realized {
                        return Err(TopologyError::Ordering {
                            device: id.to_owned(),
                            dependency: target.clone(),
                        });
                    }
                }
            }
        }

        Ok(!dev.clock_bindings.is_empty())
    }
}
