use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::customer::Customer;
use crate::decimal::Rate;
use crate::month::MonthKey;
use crate::types::{VillageId, WorkerId, ZoneId};

use super::{Aggregator, CollectionSummary};

/// summary of one group alongside its share of the whole population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown<K> {
    pub key: K,
    pub summary: CollectionSummary,
    /// group customers / all customers considered
    pub customer_share: Rate,
}

impl<'e> Aggregator<'e> {
    /// summaries keyed by `key_fn`; customers without a key are left out
    pub fn aggregate_by<'c, I, K, F>(&self, customers: I, month: MonthKey, key_fn: F) -> BTreeMap<K, CollectionSummary>
    where
        I: IntoIterator<Item = &'c Customer>,
        K: Ord,
        F: Fn(&Customer) -> Option<K>,
    {
        let mut groups: BTreeMap<K, CollectionSummary> = BTreeMap::new();
        for customer in customers {
            if let Some(key) = key_fn(customer) {
                let snapshot = self.engine().snapshot(customer, month);
                groups.entry(key).or_default().add(&snapshot);
            }
        }
        groups
    }

    /// grouped summaries with each group's share of all `customers`
    pub fn breakdown<K, F>(&self, customers: &[Customer], month: MonthKey, key_fn: F) -> Vec<GroupBreakdown<K>>
    where
        K: Ord,
        F: Fn(&Customer) -> Option<K>,
    {
        let population = customers.len();
        self.aggregate_by(customers, month, key_fn)
            .into_iter()
            .map(|(key, summary)| GroupBreakdown {
                customer_share: Rate::of_counts(summary.customer_count, population),
                key,
                summary,
            })
            .collect()
    }

    pub fn by_zone(&self, customers: &[Customer], month: MonthKey) -> Vec<GroupBreakdown<ZoneId>> {
        self.breakdown(customers, month, |c| c.zone_id.clone())
    }

    pub fn by_village(&self, customers: &[Customer], month: MonthKey) -> Vec<GroupBreakdown<VillageId>> {
        self.breakdown(customers, month, |c| c.village_id.clone())
    }

    /// customers reach a worker through the village the worker is assigned to
    pub fn by_worker(
        &self,
        customers: &[Customer],
        month: MonthKey,
        assignments: &HashMap<VillageId, WorkerId>,
    ) -> Vec<GroupBreakdown<WorkerId>> {
        self.breakdown(customers, month, |c| {
            c.village_id
                .as_ref()
                .and_then(|village| assignments.get(village))
                .cloned()
        })
    }

    /// groups whose collection rate is below the configured group threshold
    pub fn low_collection_groups<'b, K>(&self, groups: &'b [GroupBreakdown<K>]) -> Vec<&'b GroupBreakdown<K>> {
        below_threshold(groups, self.engine().config().risk.group_threshold())
    }

    /// workers whose collection rate is below the configured worker threshold
    pub fn low_collection_workers<'b>(&self, workers: &'b [GroupBreakdown<WorkerId>]) -> Vec<&'b GroupBreakdown<WorkerId>> {
        below_threshold(workers, self.engine().config().risk.worker_threshold())
    }
}

fn below_threshold<K>(groups: &[GroupBreakdown<K>], threshold: Rate) -> Vec<&GroupBreakdown<K>> {
    groups
        .iter()
        .filter(|g| g.summary.collection_rate < threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::MonthlyPayment;
    use crate::decimal::Money;
    use crate::ledger::LedgerEngine;
    use crate::types::CustomerId;
    use rust_decimal_macros::dec;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    fn customer(id: &str, zone: &str, village: &str, paid: i64) -> Customer {
        let mut record = MonthlyPayment::new(month("2025-03"));
        record.paid = Money::from_major(paid);
        Customer::new(CustomerId::new(id), Money::from_major(50))
            .in_zone(zone)
            .in_village(village)
            .with_payment(record)
    }

    fn population() -> Vec<Customer> {
        vec![
            customer("a", "north", "v1", 50),
            customer("b", "north", "v1", 0),
            customer("c", "north", "v2", 50),
            customer("d", "south", "v3", 10),
        ]
    }

    #[test]
    fn test_by_zone() {
        let engine = LedgerEngine::standard();
        let zones = Aggregator::new(&engine).by_zone(&population(), month("2025-03"));

        assert_eq!(zones.len(), 2);
        let north = &zones[0];
        assert_eq!(north.key, "north");
        assert_eq!(north.summary.customer_count, 3);
        assert_eq!(north.summary.paid_count, 2);
        assert_eq!(north.customer_share.as_percentage(), dec!(75));

        let south = &zones[1];
        assert_eq!(south.summary.total_paid, Money::from_major(10));
        assert_eq!(south.summary.partial_count, 1);
        assert_eq!(south.customer_share.as_percentage(), dec!(25));
    }

    #[test]
    fn test_ungrouped_customers_are_skipped() {
        let engine = LedgerEngine::standard();
        let mut customers = population();
        customers.push(Customer::new(CustomerId::new("loose"), Money::from_major(50)));

        let zones = Aggregator::new(&engine).by_zone(&customers, month("2025-03"));
        let grouped: usize = zones.iter().map(|z| z.summary.customer_count).sum();
        assert_eq!(grouped, 4);
        // shares are against everyone considered
        assert_eq!(zones[0].customer_share.as_percentage(), dec!(60));
    }

    #[test]
    fn test_by_worker_through_village_assignment() {
        let engine = LedgerEngine::standard();
        let assignments: HashMap<VillageId, WorkerId> = [
            ("v1".to_string(), "w-ali".to_string()),
            ("v3".to_string(), "w-ali".to_string()),
            ("v2".to_string(), "w-sara".to_string()),
        ]
        .into_iter()
        .collect();

        let workers = Aggregator::new(&engine).by_worker(&population(), month("2025-03"), &assignments);
        assert_eq!(workers.len(), 2);
        assert_eq!(workers[0].key, "w-ali");
        assert_eq!(workers[0].summary.customer_count, 3);
        assert_eq!(workers[1].key, "w-sara");
        assert_eq!(workers[1].summary.total_paid, Money::from_major(50));
    }

    #[test]
    fn test_low_collection_flags() {
        let engine = LedgerEngine::standard();
        let aggregator = Aggregator::new(&engine);
        let villages = aggregator.by_village(&population(), month("2025-03"));

        // v1 50%, v2 100%, v3 20%
        let flagged: Vec<&str> = aggregator
            .low_collection_groups(&villages)
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(flagged, vec!["v3"]);

        let workers = aggregator.breakdown(&population(), month("2025-03"), |c| c.village_id.clone());
        let low_workers: Vec<&str> = aggregator
            .low_collection_workers(&workers)
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(low_workers, vec!["v1", "v3"]);
    }
}
