use std::collections::{btree_map::Entry, BTreeMap};

/// Fills a table cell exactly once.
///
/// Returns `Err` with the value already in the cell when `value` differs from
/// it; writing the same value twice is accepted. Cells are never overwritten,
/// so callers turn the error into a typed conflict and abort construction.
pub(crate) fn claim_cell<K, V>(row: &mut BTreeMap<K, V>, key: K, value: V) -> Result<(), V>
where
    K: Ord,
    V: PartialEq + Copy,
{
    match row.entry(key) {
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
        Entry::Occupied(e) if *e.get() == value => Ok(()),
        Entry::Occupied(e) => Err(*e.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_is_not_a_conflict() {
        let mut row = BTreeMap::new();
        assert_eq!(claim_cell(&mut row, 'a', 1), Ok(()));
        assert_eq!(claim_cell(&mut row, 'a', 1), Ok(()));
        assert_eq!(claim_cell(&mut row, 'b', 2), Ok(()));
    }

    #[test]
    fn different_value_keeps_first() {
        let mut row = BTreeMap::new();
        claim_cell(&mut row, 'a', 1).unwrap();
        assert_eq!(claim_cell(&mut row, 'a', 2), Err(1));
        assert_eq!(row[&'a'], 1);
    }
}
