//! core::hierarchy
//!
//! Base/zone/family vocabulary over a generic [`Lattice`].
//!
//! Multi-block datasets are usually described as bases holding zones,
//! plus families grouping zones across bases. [`HierarchyLattice`] maps
//! that onto paths:
//!
//! | Concept | Path |
//! |---------|------|
//! | base    | `/Hierarchy/<base>` |
//! | zone    | `/Hierarchy/<base>/<zone>` |
//! | family  | `/Families/<family>` |
//!
//! Family membership is a cross-link from the family node to the zone, so
//! it never affects the derived state of either subtree.

use super::lattice::{Lattice, LatticeError};
use super::types::{NodeId, NodeName, SelectionState};

const HIERARCHY: &str = "/Hierarchy";
const FAMILIES: &str = "/Families";

/// Each name becomes one path segment, so it must be a valid node name.
fn segment(name: &str) -> Result<&str, LatticeError> {
    NodeName::new(name)?;
    Ok(name)
}

fn base_path(base: &str) -> Result<String, LatticeError> {
    Ok(format!("{HIERARCHY}/{}", segment(base)?))
}

fn zone_path(base: &str, zone: &str) -> Result<String, LatticeError> {
    Ok(format!("{}/{}", base_path(base)?, segment(zone)?))
}

fn family_path(family: &str) -> Result<String, LatticeError> {
    Ok(format!("{FAMILIES}/{}", segment(family)?))
}

/// A lattice addressed by base, zone and family names.
#[derive(Debug, Clone, Default)]
pub struct HierarchyLattice {
    lattice: Lattice,
}

impl From<Lattice> for HierarchyLattice {
    fn from(lattice: Lattice) -> Self {
        Self { lattice }
    }
}

impl HierarchyLattice {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generic lattice underneath.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn into_inner(self) -> Lattice {
        self.lattice
    }

    pub fn add_base(&mut self, base: &str) -> Result<NodeId, LatticeError> {
        self.lattice.add_node_at_path(&base_path(base)?)
    }

    /// Add a zone, creating its base if needed.
    pub fn add_zone(&mut self, base: &str, zone: &str) -> Result<NodeId, LatticeError> {
        self.lattice.add_node_at_path(&zone_path(base, zone)?)
    }

    pub fn add_family(&mut self, family: &str) -> Result<NodeId, LatticeError> {
        self.lattice.add_node_at_path(&family_path(family)?)
    }

    /// Link `family` to a zone, creating either end if needed.
    ///
    /// Returns true if the membership is new.
    pub fn add_family_member(
        &mut self,
        family: &str,
        base: &str,
        zone: &str,
    ) -> Result<bool, LatticeError> {
        let family = self.add_family(family)?;
        let zone = self.add_zone(base, zone)?;
        self.lattice.add_cross_link(family, zone)
    }

    /// Fully-qualified paths of the zones linked from `family`.
    pub fn family_members(&self, family: &str) -> Vec<String> {
        let Some(id) = family_path(family)
            .ok()
            .and_then(|path| self.lattice.find_node(&path))
        else {
            return Vec::new();
        };
        self.lattice
            .cross_links(id)
            .into_iter()
            .filter_map(|zone| self.lattice.node_path(zone))
            .collect()
    }

    pub fn select_base(&mut self, base: &str) -> Result<bool, LatticeError> {
        self.lattice.select_path(&base_path(base)?)
    }

    pub fn deselect_base(&mut self, base: &str) -> Result<bool, LatticeError> {
        self.lattice.deselect_path(&base_path(base)?)
    }

    pub fn select_zone(&mut self, base: &str, zone: &str) -> Result<bool, LatticeError> {
        self.lattice.select_path(&zone_path(base, zone)?)
    }

    pub fn deselect_zone(&mut self, base: &str, zone: &str) -> Result<bool, LatticeError> {
        self.lattice.deselect_path(&zone_path(base, zone)?)
    }

    pub fn select_family(&mut self, family: &str) -> Result<bool, LatticeError> {
        self.lattice.select_path(&family_path(family)?)
    }

    pub fn deselect_family(&mut self, family: &str) -> Result<bool, LatticeError> {
        self.lattice.deselect_path(&family_path(family)?)
    }

    pub fn base_state(&self, base: &str) -> SelectionState {
        base_path(base)
            .map(|path| self.lattice.selection_state_at(&path))
            .unwrap_or(SelectionState::NotSelected)
    }

    pub fn zone_state(&self, base: &str, zone: &str) -> SelectionState {
        zone_path(base, zone)
            .map(|path| self.lattice.selection_state_at(&path))
            .unwrap_or(SelectionState::NotSelected)
    }

    pub fn family_state(&self, family: &str) -> SelectionState {
        family_path(family)
            .map(|path| self.lattice.selection_state_at(&path))
            .unwrap_or(SelectionState::NotSelected)
    }
}
