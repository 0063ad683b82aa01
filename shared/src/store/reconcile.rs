//! Keep a derived list in lockstep with its source list

use crate::models::{NutrientRow, NutrientRowType};

/// An entry derived from one element of a source list
pub trait DerivedEntry {
    type Key: PartialEq;

    /// Key of the source element, or `None` for entries that are not tracked and
    /// always survive
    fn source_key(&self) -> Option<Self::Key>;

    fn entry_id(&self) -> u32;
}

impl DerivedEntry for NutrientRow {
    type Key = usize;

    fn source_key(&self) -> Option<usize> {
        (self.row_type == NutrientRowType::Crop).then_some(self.source_index)
    }

    fn entry_id(&self) -> u32 {
        self.id
    }
}

/// Reconcile `existing` against `sources`.
///
/// Tracked entries whose key is gone are pruned, duplicates of a key keep their first
/// occurrence, untracked entries stay. Every source without an entry gets a new one
/// appended in source order, numbered from one past the highest surviving id (or 0).
pub fn reconcile<E, S, K, F>(
    existing: Vec<E>,
    sources: &[S],
    key_of: impl Fn(&S) -> K,
    mut build: F,
) -> Vec<E>
where
    E: DerivedEntry<Key = K>,
    K: PartialEq,
    F: FnMut(u32, &S) -> E,
{
    let keys: Vec<K> = sources.iter().map(&key_of).collect();

    let mut seen: Vec<K> = Vec::new();
    let mut entries: Vec<E> = Vec::with_capacity(existing.len() + sources.len());
    for entry in existing {
        match entry.source_key() {
            None => entries.push(entry),
            Some(key) if keys.contains(&key) && !seen.contains(&key) => {
                seen.push(key);
                entries.push(entry);
            }
            Some(_) => {}
        }
    }

    let mut next_id = entries
        .iter()
        .map(DerivedEntry::entry_id)
        .max()
        .map_or(0, |max| max + 1);

    for (source, key) in sources.iter().zip(keys) {
        if seen.contains(&key) {
            continue;
        }
        entries.push(build(next_id, source));
        seen.push(key);
        next_id += 1;
    }

    entries
}

/// Nutrient rows for a field's crops, keeping every non-crop row
pub fn reconcile_nutrient_rows(existing: Vec<NutrientRow>, crop_count: usize) -> Vec<NutrientRow> {
    let crop_indexes: Vec<usize> = (0..crop_count).collect();
    reconcile(existing, &crop_indexes, |i| *i, |id, i| NutrientRow {
        id,
        row_type: NutrientRowType::Crop,
        source_index: *i,
    })
}
