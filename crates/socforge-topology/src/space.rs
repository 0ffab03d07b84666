//! System address space: named memory regions with overlap detection.
//!
//! Non-overlay regions occupy disjoint `[base, base + size)` intervals.
//! Overlay regions may coincide with other regions and are resolved by
//! priority at lookup time, higher priority shadowing lower. The space is
//! frozen at the end of the allocation phase; later additions are rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};

/// Storage kind of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// Read-only at runtime; loadable once at boot.
    Rom,
    /// Read-write memory.
    Ram,
    /// Layered over other regions by priority instead of rejected.
    Overlay,
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rom => "rom",
            Self::Ram => "ram",
            Self::Overlay => "overlay",
        };
        f.write_str(name)
    }
}

/// A named, based, sized span of address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: String,
    base: u64,
    size: u64,
    kind: RegionKind,
    priority: i32,
}

impl Region {
    /// Create a region. `priority` is meaningful for overlays only.
    pub fn new(id: impl Into<String>, base: u64, size: u64, kind: RegionKind, priority: i32) -> Self {
        Self { id: id.into(), base, size, kind, priority }
    }

    /// ROM region shorthand.
    pub fn rom(id: impl Into<String>, base: u64, size: u64) -> Self {
        Self::new(id, base, size, RegionKind::Rom, 0)
    }

    /// RAM region shorthand.
    pub fn ram(id: impl Into<String>, base: u64, size: u64) -> Self {
        Self::new(id, base, size, RegionKind::Ram, 0)
    }

    /// Overlay region shorthand.
    pub fn overlay(id: impl Into<String>, base: u64, size: u64, priority: i32) -> Self {
        Self::new(id, base, size, RegionKind::Overlay, priority)
    }

    /// Region id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Base address.
    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Storage kind.
    #[must_use]
    pub const fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Overlay priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// One-past-the-end address.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.base + self.size
    }

    /// Whether `addr` falls inside this region.
    #[must_use]
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }

    const fn intersects(&self, other: &Self) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

/// Owns the region set of one topology.
#[derive(Debug, Default)]
pub struct AddressSpace {
    base: BTreeMap<u64, Region>,
    overlays: Vec<Region>,
    frozen: bool,
}

impl AddressSpace {
    /// Create an empty, unfrozen address space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region.
    ///
    /// # Errors
    ///
    /// `SpaceFrozen` after [`freeze`](Self::freeze); `InvalidRegion` for a
    /// zero-sized or wrapping interval; `Duplicate` for a reused id;
    /// `Overlap` when a non-overlay region intersects an existing
    /// non-overlay region.
    pub fn add_region(&mut self, region: Region) -> Result<()> {
        if self.frozen {
            return Err(TopologyError::SpaceFrozen { id: region.id });
        }
        if region.size == 0 {
            return Err(TopologyError::InvalidRegion {
                id: region.id,
                reason: "zero size".into(),
            });
        }
        if region.base.checked_add(region.size).is_none() {
            return Err(TopologyError::InvalidRegion {
                id: region.id,
                reason: "interval wraps the address space".into(),
            });
        }
        if self.region(&region.id).is_some() {
            return Err(TopologyError::duplicate("region", region.id));
        }

        if region.kind == RegionKind::Overlay {
            tracing::debug!(
                id = %region.id,
                base = %format_args!("{:#x}", region.base),
                priority = region.priority,
                "adding overlay region"
            );
            self.overlays.push(region);
            // Highest priority first; stable sort keeps insertion order
            // among equal priorities.
            self.overlays.sort_by_key(|r| std::cmp::Reverse(r.priority));
            return Ok(());
        }

        if let Some(other) = self.base.values().find(|r| r.intersects(&region)) {
            return Err(TopologyError::Overlap {
                base: region.base,
                end: region.end(),
                other: other.id.clone(),
                id: region.id,
            });
        }

        tracing::debug!(
            id = %region.id,
            base = %format_args!("{:#x}", region.base),
            size = %format_args!("{:#x}", region.size),
            "adding region"
        );
        self.base.insert(region.base, region);
        Ok(())
    }

    /// End the allocation phase; the region set is immutable afterwards.
    pub fn freeze(&mut self) {
        self.frozen = true;
        tracing::debug!(regions = self.base.len() + self.overlays.len(), "address space frozen");
    }

    /// Whether the allocation phase has ended.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Region covering `addr`: the highest-priority overlay if any, else
    /// the base region.
    #[must_use]
    pub fn lookup(&self, addr: u64) -> Option<&Region> {
        if let Some(overlay) = self.overlays.iter().find(|r| r.contains(addr)) {
            return Some(overlay);
        }
        self.base
            .range(..=addr)
            .next_back()
            .map(|(_, r)| r)
            .filter(|r| r.contains(addr))
    }

    /// Region by id.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.base
            .values()
            .chain(self.overlays.iter())
            .find(|r| r.id == id)
    }

    /// All regions ordered by base address; overlays sort after base
    /// regions at equal base.
    #[must_use]
    pub fn regions(&self) -> Vec<&Region> {
        let mut all: Vec<&Region> = self.base.values().chain(self.overlays.iter()).collect();
        all.sort_by_key(|r| (r.base, r.kind == RegionKind::Overlay, r.priority));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_regions_accepted() {
        let mut space = AddressSpace::new();
        space.add_region(Region::rom("flash", 0x0, 0xC0_0000)).unwrap();
        space.add_region(Region::ram("sram", 0x2040_0000, 0x24_0000)).unwrap();
        assert_eq!(space.regions().len(), 2);
    }

    #[test]
    fn test_overlap_rejected() {
        let mut space = AddressSpace::new();
        space.add_region(Region::rom("flash", 0x0, 0x1000)).unwrap();
        let err = space.add_region(Region::ram("shadow", 0x800, 0x1000)).unwrap_err();
        assert!(matches!(err, TopologyError::Overlap { ref other, .. } if other == "flash"));
    }

    #[test]
    fn test_overlay_may_coincide() {
        let mut space = AddressSpace::new();
        space.add_region(Region::ram("dram", 0x0, 0x1_0000)).unwrap();
        space.add_region(Region::overlay("remap", 0x0, 0x1000, 1)).unwrap();
        assert_eq!(space.lookup(0x10).unwrap().id(), "remap");
        assert_eq!(space.lookup(0x2000).unwrap().id(), "dram");
    }

    #[test]
    fn test_overlay_priority_shadows() {
        let mut space = AddressSpace::new();
        space.add_region(Region::overlay("low", 0x0, 0x1000, 0)).unwrap();
        space.add_region(Region::overlay("high", 0x0, 0x1000, 2)).unwrap();
        assert_eq!(space.lookup(0x0).unwrap().id(), "high");
    }

    #[test]
    fn test_lookup_outside_any_region() {
        let mut space = AddressSpace::new();
        space.add_region(Region::rom("flash", 0x1000, 0x1000)).unwrap();
        assert!(space.lookup(0x0).is_none());
        assert!(space.lookup(0x2000).is_none());
    }

    #[test]
    fn test_frozen_space_rejects_additions() {
        let mut space = AddressSpace::new();
        space.add_region(Region::rom("flash", 0x0, 0x1000)).unwrap();
        space.freeze();
        let err = space.add_region(Region::ram("late", 0x10_0000, 0x1000)).unwrap_err();
        assert!(matches!(err, TopologyError::SpaceFrozen { .. }));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut space = AddressSpace::new();
        let err = space.add_region(Region::rom("empty", 0x0, 0)).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidRegion { .. }));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut space = AddressSpace::new();
        space.add_region(Region::rom("flash", 0x0, 0x1000)).unwrap();
        let err = space.add_region(Region::rom("flash", 0x10_0000, 0x1000)).unwrap_err();
        assert!(matches!(err, TopologyError::Duplicate { what: "region", .. }));
    }
}
