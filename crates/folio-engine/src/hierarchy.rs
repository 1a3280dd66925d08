//! Parent/child adjacency over org units.
//!
//! The stored tree is trusted to be an acyclic forest rooted at divisions,
//! but every traversal here is iterative and carries a visited set, so a
//! malformed tree surfaces as an error instead of a hang or a stack overflow.

use std::collections::{BTreeSet, HashMap, HashSet};

use folio_core::{
  Error, Result,
  model::{OrgUnit, OrgUnitId, OrgUnitKind},
};

#[derive(Debug, Clone, Default)]
pub struct OrgIndex {
  units:    HashMap<OrgUnitId, OrgUnit>,
  children: HashMap<OrgUnitId, Vec<OrgUnitId>>,
}

impl OrgIndex {
  pub fn build(units: &[OrgUnit]) -> Self {
    let mut children: HashMap<OrgUnitId, Vec<OrgUnitId>> = HashMap::new();
    for unit in units {
      if let Some(parent) = unit.parent {
        children.entry(parent).or_default().push(unit.id);
      }
    }
    for kids in children.values_mut() {
      kids.sort_unstable();
    }

    Self {
      units: units.iter().map(|u| (u.id, u.clone())).collect(),
      children,
    }
  }

  /// Every division, ordered by id.
  pub fn divisions(&self) -> Vec<&OrgUnit> {
    let mut divisions: Vec<&OrgUnit> = self
      .units
      .values()
      .filter(|u| u.kind == OrgUnitKind::Division)
      .collect();
    divisions.sort_by_key(|u| u.id);
    divisions
  }

  /// All transitive children of `id`, excluding `id` itself.
  pub fn descendants(&self, id: OrgUnitId) -> Result<BTreeSet<OrgUnitId>> {
    if !self.units.contains_key(&id) {
      return Err(Error::UnknownOrgUnit(id));
    }

    let mut found = BTreeSet::new();
    let mut stack: Vec<OrgUnitId> = self.children_of(id).to_vec();
    while let Some(next) = stack.pop() {
      // In a forest every node is reachable through exactly one parent, so a
      // second visit can only come from a cycle.
      if next == id || !found.insert(next) {
        return Err(Error::CyclicHierarchy(next));
      }
      stack.extend_from_slice(self.children_of(next));
    }
    Ok(found)
  }

  /// `id` together with all of its descendants.
  pub fn subtree(&self, id: OrgUnitId) -> Result<BTreeSet<OrgUnitId>> {
    let mut units = self.descendants(id)?;
    units.insert(id);
    Ok(units)
  }

  /// The nearest division at or above `id`.
  pub fn owning_division(&self, id: OrgUnitId) -> Result<OrgUnitId> {
    let mut visited = HashSet::new();
    let mut cursor = id;
    loop {
      let unit = match self.units.get(&cursor) {
        Some(unit) => unit,
        None if cursor == id => return Err(Error::UnknownOrgUnit(id)),
        // A parent pointer to a unit that does not exist.
        None => return Err(Error::OrphanHierarchy(id)),
      };
      if !visited.insert(cursor) {
        return Err(Error::CyclicHierarchy(cursor));
      }
      if unit.kind == OrgUnitKind::Division {
        return Ok(cursor);
      }
      match unit.parent {
        Some(parent) => cursor = parent,
        None => return Err(Error::OrphanHierarchy(id)),
      }
    }
  }

  fn children_of(&self, id: OrgUnitId) -> &[OrgUnitId] {
    self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
  }
}
