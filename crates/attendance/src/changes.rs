use std::collections::{BTreeMap, BTreeSet};

use shared::domain::{CompanyId, ParticipantSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceCounters(BTreeMap<CompanyId, usize>);

impl PresenceCounters {
    /// Every company seen in the batch gets an entry, even with nobody present.
    pub fn tally(records: &[ParticipantSnapshot]) -> Self {
        let mut counts = BTreeMap::new();
        for record in records {
            let present = counts.entry(record.company_id).or_insert(0);
            if record.present {
                *present += 1;
            }
        }
        Self(counts)
    }

    pub fn get(&self, company_id: CompanyId) -> usize {
        self.0.get(&company_id).copied().unwrap_or(0)
    }

    /// Companies in `self` whose count differs from `previous`. Missing in `previous` counts as 0.
    pub fn changed_since(&self, previous: &PresenceCounters) -> BTreeSet<CompanyId> {
        self.0
            .iter()
            .filter(|(id, present)| previous.get(**id) != **present)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl FromIterator<(CompanyId, usize)> for PresenceCounters {
    fn from_iter<T: IntoIterator<Item = (CompanyId, usize)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "tests/changes_tests.rs"]
mod tests;
