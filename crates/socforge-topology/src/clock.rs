//! Clock derivation graph.
//!
//! A clock is either a root with an authoritative rate or derived from one
//! upstream node. Rates are stated in exactly one domain (frequency or
//! period); the other is the reciprocal. Resolution walks the derivation
//! chain to a root and rejects cycles. The graph freezes when the first
//! clock-bound device realizes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};

/// Authoritative rate of a clock, in one domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockRate {
    /// Frequency in hertz.
    Hz(f64),
    /// Period in nanoseconds.
    PeriodNs(f64),
}

impl ClockRate {
    /// Frequency in Hz, derived by reciprocal when the period is
    /// authoritative.
    #[must_use]
    pub fn hz(&self) -> f64 {
        match self {
            Self::Hz(hz) => *hz,
            Self::PeriodNs(ns) => 1e9 / ns,
        }
    }

    /// Period in ns, derived by reciprocal when the frequency is
    /// authoritative.
    #[must_use]
    pub fn period_ns(&self) -> f64 {
        match self {
            Self::Hz(hz) => 1e9 / hz,
            Self::PeriodNs(ns) => *ns,
        }
    }
}

/// How a derived clock relates to its upstream node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derivation {
    /// Fixed rate, independent of the upstream rate (the upstream reference
    /// still participates in cycle checking).
    Fixed(ClockRate),
    /// Integer ratio of the upstream frequency.
    Ratio {
        /// Numerator.
        num: u32,
        /// Denominator.
        den: u32,
    },
}

#[derive(Debug, Clone)]
enum Role {
    Root { rate: ClockRate },
    Derived { upstream: String, derivation: Derivation },
}

#[derive(Debug, Clone)]
struct ClockNode {
    role: Role,
}

/// Resolved view of one clock: both domains, agreeing by reciprocal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedClock {
    /// Frequency in hertz.
    pub hz: f64,
    /// Period in nanoseconds.
    pub period_ns: f64,
}

impl ResolvedClock {
    fn from_rate(rate: ClockRate) -> Self {
        Self { hz: rate.hz(), period_ns: rate.period_ns() }
    }

    /// Whether `period_ns * hz` agrees with 1e9 to relative error ≤ 1e-6.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.period_ns * self.hz - 1e9).abs() / 1e9 <= 1e-6
    }
}

/// Owns the clock nodes of one topology.
#[derive(Debug, Default)]
pub struct ClockGraph {
    nodes: BTreeMap<String, ClockNode>,
    frozen_by: Option<String>,
}

impl ClockGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root clock with an authoritative rate.
    ///
    /// # Errors
    ///
    /// `ClockFrozen` once a dependent device has realized; `Duplicate` for
    /// a reused id.
    pub fn add_root(&mut self, id: impl Into<String>, rate: ClockRate) -> Result<()> {
        let id = id.into();
        self.check_open()?;
        self.check_fresh(&id)?;
        tracing::debug!(id = %id, ?rate, "adding root clock");
        self.nodes.insert(id, ClockNode { role: Role::Root { rate } });
        Ok(())
    }

    /// Add a derived clock. The upstream node may be declared later; its
    /// existence is checked at resolution.
    ///
    /// # Errors
    ///
    /// `ClockFrozen` once a dependent device has realized; `Duplicate` for
    /// a reused id; `InvalidClock` for a zero ratio denominator.
    pub fn add_derived(
        &mut self,
        id: impl Into<String>,
        upstream: impl Into<String>,
        derivation: Derivation,
    ) -> Result<()> {
        let id = id.into();
        self.check_open()?;
        self.check_fresh(&id)?;
        if let Derivation::Ratio { den: 0, .. } = derivation {
            return Err(TopologyError::InvalidClock {
                id,
                reason: "ratio denominator is zero".into(),
            });
        }
        let upstream = upstream.into();
        tracing::debug!(id = %id, upstream = %upstream, "adding derived clock");
        self.nodes.insert(id, ClockNode { role: Role::Derived { upstream, derivation } });
        Ok(())
    }

    /// Resolve one clock to both rate domains.
    ///
    /// # Errors
    ///
    /// `UnknownClock` when the id or an upstream reference does not
    /// resolve; `ClockCycle` when the walk revisits a node; `InvalidClock`
    /// when the resolved frequency is not finite and positive.
    pub fn resolve(&self, id: &str) -> Result<ResolvedClock> {
        let mut walk = BTreeSet::new();
        self.resolve_walk(id, &mut walk)
    }

    /// Resolve every node, in id order.
    ///
    /// # Errors
    ///
    /// First failure of [`resolve`](Self::resolve) over the node set.
    pub fn resolve_all(&self) -> Result<BTreeMap<String, ResolvedClock>> {
        let mut resolved = BTreeMap::new();
        for id in self.nodes.keys() {
            resolved.insert(id.clone(), self.resolve(id)?);
        }
        Ok(resolved)
    }

    /// Whether `id` names a node.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Freeze the graph on behalf of a realized consumer. The first caller
    /// wins; later additions fail with `ClockFrozen` naming it.
    pub fn freeze(&mut self, by: &str) {
        if self.frozen_by.is_none() {
            tracing::debug!(by = %by, "clock graph frozen");
            self.frozen_by = Some(by.to_owned());
        }
    }

    /// Whether the graph is frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen_by.is_some()
    }

    fn check_open(&self) -> Result<()> {
        match &self.frozen_by {
            Some(by) => Err(TopologyError::ClockFrozen { by: by.clone() }),
            None => Ok(()),
        }
    }

    fn check_fresh(&self, id: &str) -> Result<()> {
        if self.nodes.contains_key(id) {
            return Err(TopologyError::duplicate("clock", id));
        }
        Ok(())
    }

    fn resolve_walk(&self, id: &str, walk: &mut BTreeSet<String>) -> Result<ResolvedClock> {
        if !walk.insert(id.to_owned()) {
            return Err(TopologyError::ClockCycle { id: id.to_owned() });
        }
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TopologyError::unknown_clock(id))?;

        let resolved = match &node.role {
            Role::Root { rate } => ResolvedClock::from_rate(*rate),
            Role::Derived { upstream, derivation } => {
                let up = self.resolve_walk(upstream, walk)?;
                match derivation {
                    Derivation::Fixed(rate) => ResolvedClock::from_rate(*rate),
                    Derivation::Ratio { num, den } => {
                        let hz = up.hz * f64::from(*num) / f64::from(*den);
                        ResolvedClock { hz, period_ns: 1e9 / hz }
                    }
                }
            }
        };

        if !(resolved.hz.is_finite() && resolved.hz > 0.0) {
            return Err(TopologyError::InvalidClock {
                id: id.to_owned(),
                reason: format!("resolved frequency {} Hz is not positive", resolved.hz),
            });
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_resolves_both_domains() {
        let mut clocks = ClockGraph::new();
        clocks.add_root("sysclk", ClockRate::PeriodNs(40.69)).unwrap();
        let r = clocks.resolve("sysclk").unwrap();
        assert!((r.hz - 24_576_000.0).abs() / 24_576_000.0 < 1e-3);
        assert!(r.is_consistent());
    }

    #[test]
    fn test_fixed_derived_clock() {
        let mut clocks = ClockGraph::new();
        clocks.add_root("sysclk", ClockRate::PeriodNs(40.69)).unwrap();
        clocks
            .add_derived("refclk", "sysclk", Derivation::Fixed(ClockRate::Hz(1_000_000.0)))
            .unwrap();
        let r = clocks.resolve("refclk").unwrap();
        assert!((r.period_ns - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_ratio_derived_clock() {
        let mut clocks = ClockGraph::new();
        clocks.add_root("pll", ClockRate::Hz(48_000_000.0)).unwrap();
        clocks
            .add_derived("busclk", "pll", Derivation::Ratio { num: 1, den: 4 })
            .unwrap();
        let r = clocks.resolve("busclk").unwrap();
        assert!((r.hz - 12_000_000.0).abs() < 1e-3);
        assert!(r.is_consistent());
    }

    #[test]
    fn test_cycle_detected() {
        let mut clocks = ClockGraph::new();
        clocks
            .add_derived("a", "b", Derivation::Ratio { num: 1, den: 2 })
            .unwrap();
        clocks
            .add_derived("b", "a", Derivation::Ratio { num: 2, den: 1 })
            .unwrap();
        let err = clocks.resolve("a").unwrap_err();
        assert!(matches!(err, TopologyError::ClockCycle { .. }));
    }

    #[test]
    fn test_unknown_upstream_detected_at_resolve() {
        let mut clocks = ClockGraph::new();
        clocks
            .add_derived("orphan", "missing", Derivation::Ratio { num: 1, den: 1 })
            .unwrap();
        let err = clocks.resolve("orphan").unwrap_err();
        assert!(matches!(err, TopologyError::UnknownClock { ref id } if id == "missing"));
    }

    #[test]
    fn test_frozen_graph_rejects_additions() {
        let mut clocks = ClockGraph::new();
        clocks.add_root("sysclk", ClockRate::Hz(1e6)).unwrap();
        clocks.freeze("nvic");
        let err = clocks.add_root("late", ClockRate::Hz(1.0)).unwrap_err();
        assert!(matches!(err, TopologyError::ClockFrozen { ref by } if by == "nvic"));
    }

    #[test]
    fn test_zero_denominator_rejected() {
        let mut clocks = ClockGraph::new();
        let err = clocks
            .add_derived("bad", "sysclk", Derivation::Ratio { num: 1, den: 0 })
            .unwrap_err();
        assert!(matches!(err, TopologyError::InvalidClock { .. }));
    }

    #[test]
    fn test_reciprocal_agreement_property() {
        let mut clocks = ClockGraph::new();
        clocks.add_root("a", ClockRate::Hz(24_576_000.0)).unwrap();
        clocks.add_root("b", ClockRate::PeriodNs(40.69)).unwrap();
        for r in clocks.resolve_all().unwrap().values() {
            assert!(r.is_consistent());
        }
    }
}
