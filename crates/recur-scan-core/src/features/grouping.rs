use std::collections::{BTreeMap, HashMap};

use crate::error::{ScanError, ScanResult};
use crate::transaction::Transaction;

pub type GroupKey<'a> = (&'a str, &'a str);

/// Peer groups for one batch, keyed by exact `(user_id, name)`.
///
/// Built once per batch call and read-only afterwards; it borrows the
/// caller's records and must not outlive that batch.
#[derive(Debug, Default)]
pub struct GroupingIndex<'a> {
    groups: BTreeMap<GroupKey<'a>, Vec<&'a Transaction>>,
    positions: HashMap<u64, (GroupKey<'a>, usize)>,
    len: usize,
}

/// A date-ordered peer group seen from one of its members.
#[derive(Debug, Clone, Copy)]
pub struct PeerGroup<'g> {
    members: &'g [&'g Transaction],
    position: usize,
}

impl<'a> GroupingIndex<'a> {
    pub fn build(transactions: &'a [Transaction]) -> Self {
        let mut groups: BTreeMap<GroupKey<'a>, Vec<&'a Transaction>> = BTreeMap::new();
        for transaction in transactions {
            groups
                .entry(transaction.group_key())
                .or_default()
                .push(transaction);
        }

        let mut positions = HashMap::with_capacity(transactions.len());
        for (key, members) in groups.iter_mut() {
            // Stable: members sharing a date keep their input order.
            members.sort_by(|left, right| left.date.cmp(&right.date));
            for (index, member) in members.iter().enumerate() {
                positions.insert(member.id, (*key, index));
            }
        }

        tracing::debug!(
            transactions = transactions.len(),
            groups = groups.len(),
            "built grouping index"
        );

        Self {
            groups,
            positions,
            len: transactions.len(),
        }
    }

    pub fn lookup(&self, transaction: &Transaction) -> ScanResult<PeerGroup<'_>> {
        let not_found = || ScanError::transaction_not_in_index(transaction.id);
        let (key, position) = self.positions.get(&transaction.id).ok_or_else(not_found)?;
        if *key != transaction.group_key() {
            return Err(not_found());
        }
        let members = self.groups.get(key).ok_or_else(not_found)?;
        match members.get(*position) {
            Some(member) if member.id == transaction.id => Ok(PeerGroup {
                members: members.as_slice(),
                position: *position,
            }),
            _ => Err(not_found()),
        }
    }

    /// Peer groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupKey<'a>, &[&'a Transaction])> + '_ {
        self.groups
            .iter()
            .map(|(key, members)| (*key, members.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<'g> PeerGroup<'g> {
    pub fn members(&self) -> &'g [&'g Transaction] {
        self.members
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 == self.members.len()
    }

    pub fn previous(&self) -> Option<&'g Transaction> {
        let index = self.position.checked_sub(1)?;
        self.members.get(index).copied()
    }

    pub fn next(&self) -> Option<&'g Transaction> {
        self.members.get(self.position + 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::GroupingIndex;
    use crate::error::NOT_FOUND;
    use crate::transaction::Transaction;

    fn tx(id: u64, user: &str, name: &str, date: &str, amount: f64) -> Transaction {
        Transaction {
            id,
            user_id: user.to_string(),
            name: name.to_string(),
            amount,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or(NaiveDate::MIN),
        }
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let index = GroupingIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.group_count(), 0);
    }

    #[test]
    fn groups_by_exact_user_and_name() {
        let input = vec![
            tx(1, "u1", "Netflix", "2026-01-01", 15.99),
            tx(2, "u2", "Netflix", "2026-01-01", 15.99),
            tx(3, "u1", "netflix", "2026-01-01", 15.99),
            tx(4, "u1", "Netflix", "2026-02-01", 15.99),
        ];
        let index = GroupingIndex::build(&input);
        assert_eq!(index.group_count(), 3);
        assert_eq!(index.len(), 4);

        let group = index.lookup(&input[3]);
        assert!(group.is_ok());
        if let Ok(group) = group {
            let ids = group.members().iter().map(|t| t.id).collect::<Vec<u64>>();
            assert_eq!(ids, vec![1, 4]);
            assert_eq!(group.position(), 1);
            assert!(group.is_last());
        }
    }

    #[test]
    fn members_are_sorted_by_date_with_stable_ties() {
        let input = vec![
            tx(1, "u1", "Gym", "2026-03-01", 30.0),
            tx(2, "u1", "Gym", "2026-01-01", 30.0),
            tx(3, "u1", "Gym", "2026-02-01", 31.0),
            tx(4, "u1", "Gym", "2026-02-01", 32.0),
        ];
        let index = GroupingIndex::build(&input);
        let group = index.lookup(&input[0]);
        assert!(group.is_ok());
        if let Ok(group) = group {
            let ids = group.members().iter().map(|t| t.id).collect::<Vec<u64>>();
            assert_eq!(ids, vec![2, 3, 4, 1]);
            assert_eq!(group.previous().map(|t| t.id), Some(4));
            assert!(group.next().is_none());
        }
    }

    #[test]
    fn lookup_of_foreign_transaction_is_not_found() {
        let input = vec![tx(1, "u1", "Gym", "2026-03-01", 30.0)];
        let index = GroupingIndex::build(&input);

        let stranger = tx(99, "u1", "Gym", "2026-03-01", 30.0);
        let result = index.lookup(&stranger);
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, NOT_FOUND);
        }

        let renamed = tx(1, "u1", "Pool", "2026-03-01", 30.0);
        assert!(index.lookup(&renamed).is_err());
    }

    #[test]
    fn single_member_group_is_first_and_last() {
        let input = vec![tx(1, "u1", "OneOffStore", "2026-03-01", 42.0)];
        let index = GroupingIndex::build(&input);
        let group = index.lookup(&input[0]);
        assert!(group.is_ok());
        if let Ok(group) = group {
            assert_eq!(group.len(), 1);
            assert!(group.is_first());
            assert!(group.is_last());
            assert!(group.previous().is_none());
        }
    }

    #[test]
    fn groups_iterate_in_key_order() {
        let input = vec![
            tx(1, "u2", "B", "2026-01-01", 1.0),
            tx(2, "u1", "Z", "2026-01-01", 1.0),
            tx(3, "u1", "A", "2026-01-01", 1.0),
        ];
        let index = GroupingIndex::build(&input);
        let keys = index.groups().map(|(key, _)| key).collect::<Vec<_>>();
        assert_eq!(keys, vec![("u1", "A"), ("u1", "Z"), ("u2", "B")]);
    }
}
