//! Keeps storage systems, derived manures and nutrient analyses consistent with the
//! manure lists they reference

use uuid::Uuid;

use crate::calculations::manure::calculate_separated_solid_and_liquid;
use crate::error::{NmpError, NmpResult};
use crate::models::{
    DerivedManure, GeneratedManure, ImportedManure, ManureInSystem, ManureStorageSystem,
    NmpFileYear,
};
use crate::types::ManureType;

/// Manure list a storage system entry can point into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Generated,
    Imported,
}

/// New contents of the source list being saved
pub enum NewManures<'a> {
    Generated(&'a mut [GeneratedManure]),
    Imported(&'a mut [ImportedManure]),
}

impl NewManures<'_> {
    fn kind(&self) -> SourceKind {
        match self {
            NewManures::Generated(_) => SourceKind::Generated,
            NewManures::Imported(_) => SourceKind::Imported,
        }
    }

    fn unassign_all(&mut self) {
        match self {
            NewManures::Generated(list) => {
                list.iter_mut().for_each(|m| m.assigned_to_stored_system = false)
            }
            NewManures::Imported(list) => {
                list.iter_mut().for_each(|m| m.assigned_to_stored_system = false)
            }
        }
    }

    /// Mark the manure with this name assigned and return the entry to store for it
    fn claim(&mut self, managed_manure_name: &str) -> Option<ManureInSystem> {
        match self {
            NewManures::Generated(list) => list
                .iter_mut()
                .find(|m| m.managed_manure_name == managed_manure_name)
                .map(|m| {
                    m.assigned_to_stored_system = true;
                    ManureInSystem::Generated(m.clone())
                }),
            NewManures::Imported(list) => list
                .iter_mut()
                .find(|m| m.managed_manure_name == managed_manure_name)
                .map(|m| {
                    m.assigned_to_stored_system = true;
                    ManureInSystem::Imported(m.clone())
                }),
        }
    }
}

fn entry_kind(manure: &ManureInSystem) -> Option<SourceKind> {
    match manure {
        ManureInSystem::Generated(_) => Some(SourceKind::Generated),
        ManureInSystem::Imported(_) => Some(SourceKind::Imported),
        ManureInSystem::Derived(_) => None,
    }
}

/// Recompute separated liquids and solids of a liquid system from its contents
pub fn recompute_separation(system: &mut ManureStorageSystem) {
    if let ManureStorageSystem::Liquid(liquid) = system {
        if liquid.percent_liquid_separation > 0.0 {
            let total: f64 = liquid
                .manures_in_system
                .iter()
                .map(ManureInSystem::annual_amount)
                .sum();
            let (liquids, solids) =
                calculate_separated_solid_and_liquid(total, liquid.percent_liquid_separation);
            liquid.separated_liquids_us_gallons = liquids;
            liquid.separated_solids_tons = solids;
        }
    }
}

/// Refresh every system's entries of one source kind from the newly saved list.
///
/// Entries are replaced with the new values, entries whose manure vanished are
/// dropped, and systems left empty are removed.
pub fn refresh_systems(
    systems: Vec<ManureStorageSystem>,
    mut new_manures: NewManures<'_>,
) -> Vec<ManureStorageSystem> {
    new_manures.unassign_all();
    let kind = new_manures.kind();

    systems
        .into_iter()
        .filter_map(|mut system| {
            let previous = std::mem::take(system.manures_in_system_mut());
            let refreshed: Vec<ManureInSystem> = previous
                .into_iter()
                .filter_map(|manure| {
                    if entry_kind(&manure) == Some(kind) {
                        new_manures.claim(manure.managed_manure_name())
                    } else {
                        Some(manure)
                    }
                })
                .collect();

            if refreshed.is_empty() {
                return None;
            }
            *system.manures_in_system_mut() = refreshed;
            recompute_separation(&mut system);
            Some(system)
        })
        .collect()
}

fn separated_solids_name(position: usize) -> String {
    if position == 0 {
        "Separated solids".to_string()
    } else {
        format!("Separated solids {}", position + 1)
    }
}

/// Regenerate derived manures from liquid systems with separation, then drop stored
/// entries that point at derived manures which no longer exist
pub fn update_derived_manures(year: &mut NmpFileYear) {
    let previous = std::mem::take(&mut year.derived_manures);
    let mut derived: Vec<DerivedManure> = Vec::new();

    for system in &year.manure_storage_systems {
        let ManureStorageSystem::Liquid(liquid) = system else {
            continue;
        };
        if liquid.separated_liquids_us_gallons <= 0.0 {
            continue;
        }

        let tons = liquid.separated_solids_tons;
        let manure = match previous.iter().find(|m| m.origin_uuid == liquid.uuid) {
            Some(prev) => DerivedManure {
                annual_amount: tons,
                annual_amount_tons_weight: tons,
                ..prev.clone()
            },
            None => {
                let name = separated_solids_name(derived.len());
                DerivedManure {
                    unique_material_name: name.clone(),
                    managed_manure_name: name,
                    manure_type: ManureType::Solid,
                    annual_amount: tons,
                    annual_amount_tons_weight: tons,
                    assigned_to_stored_system: false,
                    uuid: Uuid::new_v4(),
                    origin_uuid: liquid.uuid,
                }
            }
        };
        derived.push(manure);
    }

    let systems = std::mem::take(&mut year.manure_storage_systems);
    year.manure_storage_systems = systems
        .into_iter()
        .filter_map(|mut system| {
            system.manures_in_system_mut().retain(|manure| match manure {
                ManureInSystem::Derived(d) => derived.iter().any(|m| m.uuid == d.uuid),
                _ => true,
            });
            (!system.manures_in_system().is_empty()).then_some(system)
        })
        .collect();
    year.derived_manures = derived;
}

/// Re-derive every `assigned_to_stored_system` flag from the systems' contents.
///
/// Imported and generated entries match by managed name, derived entries by uuid. An
/// entry with no matching manure is a broken document.
pub fn reassign_stored_manures(year: &mut NmpFileYear) -> NmpResult<()> {
    year.generated_manures
        .iter_mut()
        .for_each(|m| m.assigned_to_stored_system = false);
    year.imported_manures
        .iter_mut()
        .for_each(|m| m.assigned_to_stored_system = false);
    year.derived_manures
        .iter_mut()
        .for_each(|m| m.assigned_to_stored_system = false);

    for system in &year.manure_storage_systems {
        for manure in system.manures_in_system() {
            let assigned = match manure {
                ManureInSystem::Imported(m) => year
                    .imported_manures
                    .iter_mut()
                    .find(|i| i.managed_manure_name == m.managed_manure_name)
                    .map(|i| &mut i.assigned_to_stored_system)
                    .ok_or_else(|| NmpError::UnassignedManure {
                        kind: "imported",
                        key: format!("name {}", m.managed_manure_name),
                    }),
                ManureInSystem::Generated(m) => year
                    .generated_manures
                    .iter_mut()
                    .find(|g| g.managed_manure_name == m.managed_manure_name)
                    .map(|g| &mut g.assigned_to_stored_system)
                    .ok_or_else(|| NmpError::UnassignedManure {
                        kind: "generated",
                        key: format!("name {}", m.managed_manure_name),
                    }),
                ManureInSystem::Derived(m) => year
                    .derived_manures
                    .iter_mut()
                    .find(|d| d.uuid == m.uuid)
                    .map(|d| &mut d.assigned_to_stored_system)
                    .ok_or_else(|| NmpError::UnassignedManure {
                        kind: "derived",
                        key: format!("uuid {}", m.uuid),
                    }),
            }?;
            *assigned = true;
        }
    }
    Ok(())
}

/// Keep only analyses whose source is a storage system or an unstored manure
pub fn update_nutrient_analyses(year: &mut NmpFileYear) {
    let mut sources: Vec<Uuid> = year.manure_storage_systems.iter().map(|s| s.uuid()).collect();
    sources.extend(
        year.generated_manures
            .iter()
            .filter(|m| !m.assigned_to_stored_system)
            .map(|m| m.uuid),
    );
    sources.extend(
        year.imported_manures
            .iter()
            .filter(|m| !m.assigned_to_stored_system)
            .map(|m| m.uuid),
    );
    sources.extend(
        year.derived_manures
            .iter()
            .filter(|m| !m.assigned_to_stored_system)
            .map(|m| m.uuid),
    );

    year.nutrient_analyses
        .retain(|analysis| sources.contains(&analysis.source_uuid));
}

/// Run the whole consistency chain after one source list changed
pub fn sync_after_source_change(year: &mut NmpFileYear, kind: SourceKind) {
    let systems = std::mem::take(&mut year.manure_storage_systems);
    year.manure_storage_systems = match kind {
        SourceKind::Generated => {
            refresh_systems(systems, NewManures::Generated(&mut year.generated_manures))
        }
        SourceKind::Imported => {
            refresh_systems(systems, NewManures::Imported(&mut year.imported_manures))
        }
    };
    if kind == SourceKind::Generated {
        update_derived_manures(year);
    }
    update_nutrient_analyses(year);
}
