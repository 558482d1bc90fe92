//! # Distribution Planner
//!
//! Suggests a full split for a total without touching any engine.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    plan(total, methods, wallet, prefs)                  │
//! │                                                                         │
//! │  remaining = total                                                      │
//! │                                                                         │
//! │  1. PREFERENCES (canonical method order)                                │
//! │     amount = min(pref, remaining, policy max, wallet if membership)     │
//! │     below the method minimum ──► skipped                                │
//! │                                                                         │
//! │  2. WALK (every method, not just the first with room)                   │
//! │     membership ─► cash ─► upi ─► debit_card ─► credit_card ─► bnpl      │
//! │     each takes min(remaining, room under its cap)                       │
//! │     bnpl skipped while remaining < its minimum                          │
//! │                                                                         │
//! │  Result: a PaymentAllocation the engine can adopt()                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods not in `available` are never used. If the available methods
//! cannot absorb the total the plan is left short; the validator reports it.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::allocation::PaymentAllocation;
use crate::money::Money;
use crate::policy::PolicyTable;
use crate::types::{MembershipBalance, PaymentMethod};

/// Walk order: cheapest for the store first, deferred credit last.
const PRIORITY_ORDER: [PaymentMethod; 6] = [
    PaymentMethod::Membership,
    PaymentMethod::Cash,
    PaymentMethod::Upi,
    PaymentMethod::DebitCard,
    PaymentMethod::CreditCard,
    PaymentMethod::Bnpl,
];

/// Stateless split suggester bound to a policy table.
#[derive(Debug, Clone)]
pub struct DistributionPlanner {
    policies: Arc<PolicyTable>,
}

impl DistributionPlanner {
    pub fn new(policies: Arc<PolicyTable>) -> Self {
        DistributionPlanner { policies }
    }

    /// Plans an allocation of `total` across `available` methods.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use tender_core::planner::DistributionPlanner;
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::{MembershipBalance, Money, PaymentMethod};
    ///
    /// let planner = DistributionPlanner::new(Arc::new(PolicyTable::default()));
    /// let wallet = MembershipBalance::active(Money::from_major(1_000));
    /// let plan = planner.plan(
    ///     Money::from_major(250_000),
    ///     &[PaymentMethod::Membership, PaymentMethod::Upi, PaymentMethod::CreditCard],
    ///     Some(&wallet),
    ///     None,
    /// );
    ///
    /// assert_eq!(plan.get(PaymentMethod::Membership), Money::from_major(1_000));
    /// assert_eq!(plan.get(PaymentMethod::Upi), Money::from_major(100_000));
    /// assert_eq!(plan.get(PaymentMethod::CreditCard), Money::from_major(149_000));
    /// ```
    pub fn plan(
        &self,
        total: Money,
        available: &[PaymentMethod],
        membership: Option<&MembershipBalance>,
        preferences: Option<&BTreeMap<PaymentMethod, Money>>,
    ) -> PaymentAllocation {
        let mut plan = PaymentAllocation::new();
        let mut remaining = total.non_negative();
        let wallet = membership.map(MembershipBalance::spendable).unwrap_or_default();

        // Room a method has left given what the plan already holds
        let room = |plan: &PaymentAllocation, method: PaymentMethod| -> Option<Money> {
            let current = plan.get(method);
            let policy_room = self.policies.get(method).headroom(current);
            if method.is_membership() {
                let wallet_room = wallet.saturating_sub_zero(current);
                Some(policy_room.map_or(wallet_room, |r| r.min(wallet_room)))
            } else {
                policy_room
            }
        };

        if let Some(preferences) = preferences {
            for (&method, &wanted) in preferences {
                if !available.contains(&method) || !wanted.is_positive() {
                    continue;
                }

                let mut amount = wanted.min(remaining);
                if let Some(r) = room(&plan, method) {
                    amount = amount.min(r);
                }

                let below_min = self
                    .policies
                    .min_amount(method)
                    .is_some_and(|min| amount < min);
                if below_min || !amount.is_positive() {
                    debug!(method = %method, wanted = %wanted, "Preference skipped");
                    continue;
                }

                plan.set(method, amount);
                remaining -= amount;
            }
        }

        for method in PRIORITY_ORDER {
            if !remaining.is_positive() {
                break;
            }
            if !available.contains(&method) {
                continue;
            }

            if let Some(min) = self.policies.min_amount(method) {
                if remaining < min {
                    continue;
                }
            }

            let amount = match room(&plan, method) {
                Some(r) => remaining.min(r),
                None => remaining,
            };

            if amount.is_positive() {
                plan.set(method, plan.get(method) + amount);
                remaining -= amount;
            }
        }

        debug!(total = %total, unplanned = %remaining, "Distribution planned");
        plan
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
