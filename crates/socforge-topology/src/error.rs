//! Error types for topology assembly.

use std::fmt;

use thiserror::Error;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors that can occur while assembling a topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// Two non-overlay regions claim intersecting address intervals.
    #[error("region `{id}` [{base:#x}, {end:#x}) overlaps `{other}`")]
    Overlap {
        /// Region being added.
        id: String,
        /// Base address of the new region.
        base: u64,
        /// One-past-the-end address of the new region.
        end: u64,
        /// Region already occupying part of the interval.
        other: String,
    },

    /// A region description is malformed (zero size, address wrap, …).
    #[error("region `{id}` is invalid: {reason}")]
    InvalidRegion {
        /// Offending region.
        id: String,
        /// Reason for rejection.
        reason: String,
    },

    /// The address space no longer accepts regions.
    #[error("address space is frozen; cannot add region `{id}`")]
    SpaceFrozen {
        /// Region that arrived after the allocation phase ended.
        id: String,
    },

    /// An id was declared twice.
    #[error("duplicate {what} id `{id}`")]
    Duplicate {
        /// What kind of object collided.
        what: &'static str,
        /// The colliding id.
        id: String,
    },

    /// A region id did not resolve.
    #[error("unknown region `{id}`")]
    UnknownRegion {
        /// Requested id.
        id: String,
    },

    /// A clock derivation chain revisits one of its own nodes.
    #[error("clock `{id}` participates in a derivation cycle")]
    ClockCycle {
        /// Node at which the walk closed on itself.
        id: String,
    },

    /// The clock graph no longer accepts nodes.
    #[error("clock graph is frozen (first realized consumer: `{by}`)")]
    ClockFrozen {
        /// Device whose realization froze the graph.
        by: String,
    },

    /// A clock description is malformed.
    #[error("clock `{id}` is invalid: {reason}")]
    InvalidClock {
        /// Offending clock.
        id: String,
        /// Reason for rejection.
        reason: String,
    },

    /// A clock id did not resolve.
    #[error("unknown clock `{id}`")]
    UnknownClock {
        /// Requested id.
        id: String,
    },

    /// A device id did not resolve.
    #[error("unknown device `{id}`")]
    UnknownDevice {
        /// Requested id.
        id: String,
    },

    /// A device type name is not in the contract table.
    #[error("unknown device type `{type_name}`")]
    UnknownDeviceType {
        /// Requested type name.
        type_name: String,
    },

    /// A binding required by the device's contract is absent.
    #[error("`{owner}` is missing required {what} `{name}`")]
    MissingDependency {
        /// Device (or stage) whose requirement is unmet.
        owner: String,
        /// Requirement category (clock input, memory link, property, …).
        what: &'static str,
        /// Requirement name.
        name: String,
    },

    /// The device lifecycle only moves forward.
    #[error("device `{device}` already realized (state {state})")]
    AlreadyRealized {
        /// Device on which the transition was attempted.
        device: String,
        /// Its terminal state.
        state: String,
    },

    /// A structural dependency has not been realized yet.
    #[error("device `{device}` cannot realize before `{dependency}`")]
    Ordering {
        /// Device attempting to realize or route.
        device: String,
        /// Device that must be realized first.
        dependency: String,
    },

    /// A controller input line is already owned by another edge.
    #[error("controller input {line} already routed from `{owner}`")]
    DuplicateLine {
        /// Contested input line.
        line: u32,
        /// Device that owns it.
        owner: String,
    },

    /// The interrupt controller must be realized before routing.
    #[error("interrupt controller `{controller}` is not realized")]
    UnrealizedController {
        /// Controller device id.
        controller: String,
    },

    /// A route index exceeds the declared width.
    #[error("interrupt index {index} out of range ({count} available)")]
    LineOutOfRange {
        /// Requested line or output index.
        index: u32,
        /// Declared count.
        count: u32,
    },

    /// Firmware does not fit the target region.
    #[error("firmware [{offset:#x}, {end:#x}) exceeds region `{region}` of size {size:#x}")]
    OutOfBounds {
        /// Target region id.
        region: String,
        /// Load offset within the region.
        offset: u64,
        /// One-past-the-end offset of the image.
        end: u64,
        /// Region size.
        size: u64,
    },

    /// The target region is not loadable at boot.
    #[error("region `{region}` ({kind}) is not loadable at boot")]
    RegionKind {
        /// Target region id.
        region: String,
        /// Its storage kind.
        kind: String,
    },
}

impl TopologyError {
    /// Create a duplicate-id error.
    pub fn duplicate(what: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate { what, id: id.into() }
    }

    /// Create an unknown-region error.
    pub fn unknown_region(id: impl Into<String>) -> Self {
        Self::UnknownRegion { id: id.into() }
    }

    /// Create an unknown-clock error.
    pub fn unknown_clock(id: impl Into<String>) -> Self {
        Self::UnknownClock { id: id.into() }
    }

    /// Create an unknown-device error.
    pub fn unknown_device(id: impl Into<String>) -> Self {
        Self::UnknownDevice { id: id.into() }
    }

    /// Create a missing-dependency error.
    pub fn missing(owner: impl Into<String>, what: &'static str, name: impl Into<String>) -> Self {
        Self::MissingDependency {
            owner: owner.into(),
            what,
            name: name.into(),
        }
    }
}

/// Phase of the board build during which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Allocating memory regions.
    Regions,
    /// Building and resolving the clock graph.
    Clocks,
    /// Declaring and configuring devices.
    Devices,
    /// Realizing devices in dependency order.
    Realize,
    /// Routing interrupt edges.
    Interrupts,
    /// Staging the firmware image.
    Firmware,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Regions => "region allocation",
            Self::Clocks => "clock graph construction",
            Self::Devices => "device configuration",
            Self::Realize => "device realization",
            Self::Interrupts => "interrupt routing",
            Self::Firmware => "firmware staging",
        };
        f.write_str(name)
    }
}

/// The only failure artifact a build exposes: the phase that aborted the
/// build and the underlying cause. No partial topology accompanies it.
#[derive(Debug, Error)]
#[error("board build failed during {phase}: {cause}")]
pub struct BuildError {
    phase: BuildPhase,
    #[source]
    cause: TopologyError,
}

impl BuildError {
    /// Wrap a topology error with the phase it aborted.
    #[must_use]
    pub fn new(phase: BuildPhase, cause: TopologyError) -> Self {
        Self { phase, cause }
    }

    /// Phase during which the build aborted.
    #[must_use]
    pub const fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Underlying error kind.
    #[must_use]
    pub const fn cause(&self) -> &TopologyError {
        &self.cause
    }
}
