//! Partition records into one group per normalized address.

use crate::models::{AddressIndex, Group, Record};

/// Group records by `address`.
///
/// Groups come out in first-occurrence order of their address and each
/// group's rows keep input order, so the whole pass is deterministic.
pub fn group_by_address(records: &[Record]) -> Vec<Group> {
    let mut index = AddressIndex::default();
    let mut groups: Vec<Group> = Vec::new();

    for (row, record) in records.iter().enumerate() {
        if let Some(&group_idx) = index.get(record.address.as_str()) {
            groups[group_idx].rows.push(row);
            continue;
        }
        index.insert(record.address.clone(), groups.len());
        groups.push(Group {
            address: record.address.clone(),
            rows: vec![row],
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str) -> Record {
        Record {
            address: address.to_string(),
            in_search: true,
            rating: None,
            rating_count: None,
            categories: Vec::new(),
            primary_slot: None,
            cells: Vec::new(),
        }
    }

    #[test]
    fn test_first_occurrence_order() {
        let records: Vec<Record> = ["b st", "a st", "b st", "c st", "a st", "b st"]
            .iter()
            .map(|a| record(a))
            .collect();
        let groups = group_by_address(&records);

        let addresses: Vec<&str> = groups.iter().map(|g| g.address.as_str()).collect();
        assert_eq!(addresses, vec!["b st", "a st", "c st"]);
        assert_eq!(groups[0].rows, vec![0, 2, 5]);
        assert_eq!(groups[1].rows, vec![1, 4]);
        assert_eq!(groups[2].rows, vec![3]);
        assert!(groups[2].is_singleton());
    }

    #[test]
    fn test_every_row_in_exactly_one_group() {
        let records: Vec<Record> = (0..20).map(|i| record(&format!("{} st", i % 7))).collect();
        let groups = group_by_address(&records);

        let mut seen: Vec<usize> = groups.iter().flat_map(|g| g.rows.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert!(groups.iter().all(|g| !g.is_empty()));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_address(&[]).is_empty());
    }
}
