use crate::customer::Customer;
use crate::decimal::Money;
use crate::month::MonthKey;
use crate::types::CarryOverPolicy;

use super::{snapshot_with_carry, MonthSnapshot};

/// the run of months whose balances feed into a target month
///
/// Under `Recompute` the chain reaches back through every contiguous month
/// that has a record and is not flagged settled. The month before the start
/// of the chain either has no record or is flagged settled, so it carries
/// nothing. Under `StoredRemaining` the chain is just the target month and
/// the boundary carry is the stored remainder of the month before it, unless
/// that month's own paid amount already covers what it owed.
#[derive(Debug, Clone)]
pub struct CarryOverChain<'c> {
    customer: &'c Customer,
    start: MonthKey,
    target: MonthKey,
    policy: CarryOverPolicy,
}

impl<'c> CarryOverChain<'c> {
    pub fn new(customer: &'c Customer, target: MonthKey, policy: CarryOverPolicy) -> Self {
        let mut start = target;
        if policy == CarryOverPolicy::Recompute {
            while let Some(prev) = start.previous() {
                match customer.payment(prev) {
                    Some(record) if !record.fully_paid => start = prev,
                    _ => break,
                }
            }
        }

        Self {
            customer,
            start,
            target,
            policy,
        }
    }

    /// first month of the chain
    pub fn start(&self) -> MonthKey {
        self.start
    }

    /// number of months resolved to reach the target
    pub fn len(&self) -> usize {
        self.start.through(self.target).len()
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.target
    }

    /// carry into the first month of the chain
    fn boundary_carry(&self) -> Money {
        let Some(prev) = self.start.previous() else {
            return Money::ZERO;
        };
        match self.customer.payment(prev) {
            None => Money::ZERO,
            Some(record) if record.fully_paid => Money::ZERO,
            Some(record) => match self.policy {
                CarryOverPolicy::StoredRemaining => {
                    // a stale stored remainder must not outlive a covered month
                    let settled = CarryOverChain::new(self.customer, prev, self.policy).resolve().fully_paid;
                    if settled {
                        Money::ZERO
                    } else {
                        record.stored_remaining().unwrap_or(Money::ZERO)
                    }
                }
                // the chain walked past every unsettled record, so this is unreachable
                CarryOverPolicy::Recompute => Money::ZERO,
            },
        }
    }

    /// resolve each month of the chain in order and return the target snapshot
    pub fn resolve(&self) -> MonthSnapshot {
        let mut carry = self.boundary_carry();
        let mut cursor = self.start;
        loop {
            let snapshot = snapshot_with_carry(self.customer, cursor, carry);
            let Some(next) = cursor.next().filter(|_| cursor < self.target) else {
                return snapshot;
            };
            carry = snapshot.remaining;
            cursor = next;
        }
    }

    /// carry-over into the target month alone
    pub fn carry_into_target(&self) -> Money {
        if self.start == self.target {
            return self.boundary_carry();
        }
        let mut carry = self.boundary_carry();
        let mut cursor = self.start;
        while cursor < self.target {
            carry = snapshot_with_carry(self.customer, cursor, carry).remaining;
            match cursor.next() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        carry
    }
}
