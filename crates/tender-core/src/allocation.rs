//! # Payment Allocation
//!
//! The live method → amount mapping for one checkout, and the engine that
//! mutates it.
//!
//! ## Engine Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Allocation Engine Operations                         │
//! │                                                                         │
//! │  Caller Action            Engine Method             Allocation Change   │
//! │  ─────────────            ─────────────             ─────────────────   │
//! │                                                                         │
//! │  Cart changed ──────────► set_payable_total() ────► membership re-read  │
//! │                                                                         │
//! │  Type an amount ────────► set_amount() ───────────► one method, clamped │
//! │                                                                         │
//! │  Pick one method ───────► set_single_method() ────► method = to pay     │
//! │                                                                         │
//! │  "Split equally" ───────► distribute_equally() ───► 4 methods, floored  │
//! │                                                                         │
//! │  "Fill rest" ───────────► auto_balance_remaining()► first method w/ room│
//! │                                                                         │
//! │  "Clear" ───────────────► clear_all() ────────────► all but membership  │
//! │                                                                         │
//! │  NOTE: membership is never written by a caller. Every mutator ends      │
//! │        with the membership reservation re-applied.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - No amount is ever negative
//! - A capped method never holds more than its policy maximum
//! - `membership == min(payable_total, spendable balance)` after every call
//!
//! ## Usage
//! ```rust
//! use std::sync::Arc;
//! use tender_core::allocation::AllocationEngine;
//! use tender_core::policy::PolicyTable;
//! use tender_core::{MembershipBalance, Money, PaymentMethod};
//!
//! let mut engine = AllocationEngine::new(
//!     Arc::new(PolicyTable::default()),
//!     Money::from_major(10_000),
//!     MembershipBalance::active(Money::from_major(2_500)),
//! );
//! assert_eq!(engine.client_to_pay(), Money::from_major(7_500));
//!
//! engine.set_amount(PaymentMethod::Cash, Money::from_major(7_500));
//! assert!(engine.remaining().is_zero());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::money::Money;
use crate::policy::PolicyTable;
use crate::types::{MembershipBalance, PaymentMethod, PaymentMode};

/// Fill order used by `auto_balance_remaining`.
const AUTO_BALANCE_ORDER: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Upi,
    PaymentMethod::CreditCard,
    PaymentMethod::DebitCard,
];

// =============================================================================
// Payment Allocation
// =============================================================================

/// Amount assigned to each payment method.
///
/// Amounts are never negative: `set` clamps. Caps are not enforced here
/// because a planner or caller may hand over anything; the validator judges
/// caps, the engine enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", from = "RawPaymentAllocation")]
pub struct PaymentAllocation {
    cash: Money,
    credit_card: Money,
    debit_card: Money,
    upi: Money,
    bnpl: Money,
    membership: Money,
}

/// Wire form of [`PaymentAllocation`]; every amount goes through `set`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawPaymentAllocation {
    #[serde(default)]
    cash: Money,
    #[serde(default)]
    credit_card: Money,
    #[serde(default)]
    debit_card: Money,
    #[serde(default)]
    upi: Money,
    #[serde(default)]
    bnpl: Money,
    #[serde(default)]
    membership: Money,
}

impl From<RawPaymentAllocation> for PaymentAllocation {
    fn from(raw: RawPaymentAllocation) -> Self {
        PaymentAllocation::new()
            .with(PaymentMethod::Cash, raw.cash)
            .with(PaymentMethod::CreditCard, raw.credit_card)
            .with(PaymentMethod::DebitCard, raw.debit_card)
            .with(PaymentMethod::Upi, raw.upi)
            .with(PaymentMethod::Bnpl, raw.bnpl)
            .with(PaymentMethod::Membership, raw.membership)
    }
}

impl PaymentAllocation {
    /// An allocation with every method at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    ///
    /// ## Example
    /// ```rust
    /// use tender_core::allocation::PaymentAllocation;
    /// use tender_core::{Money, PaymentMethod};
    ///
    /// let alloc = PaymentAllocation::new()
    ///     .with(PaymentMethod::Cash, Money::from_major(4_000))
    ///     .with(PaymentMethod::CreditCard, Money::from_major(3_000));
    /// assert_eq!(alloc.total(), Money::from_major(7_000));
    /// ```
    pub fn with(mut self, method: PaymentMethod, amount: Money) -> Self {
        self.set(method, amount);
        self
    }

    pub fn get(&self, method: PaymentMethod) -> Money {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::CreditCard => self.credit_card,
            PaymentMethod::DebitCard => self.debit_card,
            PaymentMethod::Upi => self.upi,
            PaymentMethod::Bnpl => self.bnpl,
            PaymentMethod::Membership => self.membership,
        }
    }

    /// Stores an amount, clamping negatives to zero.
    pub fn set(&mut self, method: PaymentMethod, amount: Money) {
        let slot = match method {
            PaymentMethod::Cash => &mut self.cash,
            PaymentMethod::CreditCard => &mut self.credit_card,
            PaymentMethod::DebitCard => &mut self.debit_card,
            PaymentMethod::Upi => &mut self.upi,
            PaymentMethod::Bnpl => &mut self.bnpl,
            PaymentMethod::Membership => &mut self.membership,
        };
        *slot = amount.non_negative();
    }

    /// Every method and its amount, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PaymentMethod, Money)> + '_ {
        PaymentMethod::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Methods holding a positive amount, in canonical order.
    pub fn positive(&self) -> impl Iterator<Item = (PaymentMethod, Money)> + '_ {
        self.iter().filter(|(_, amount)| amount.is_positive())
    }

    #[inline]
    pub fn membership(&self) -> Money {
        self.membership
    }

    /// Sum of everything except the wallet.
    pub fn non_membership_total(&self) -> Money {
        self.iter()
            .filter(|(m, _)| !m.is_membership())
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Sum of every method including the wallet.
    pub fn total(&self) -> Money {
        self.iter().map(|(_, amount)| amount).sum()
    }

    /// True when no method holds a positive amount.
    pub fn is_empty(&self) -> bool {
        self.positive().next().is_none()
    }

    /// Zeroes every method except the wallet.
    fn clear_non_membership(&mut self) {
        let membership = self.membership;
        *self = PaymentAllocation {
            membership,
            ..PaymentAllocation::default()
        };
    }
}

// =============================================================================
// Allocation Engine
// =============================================================================

/// Owns the allocation for one checkout.
///
/// ## Thread Safety
/// None needed: one engine per checkout, driven synchronously by whoever
/// owns the checkout. The policy table is shared read-only via `Arc`.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    policies: Arc<PolicyTable>,
    allocation: PaymentAllocation,
    payable_total: Money,
    membership: MembershipBalance,
    mode: PaymentMode,
    selected_method: Option<PaymentMethod>,
}

impl AllocationEngine {
    /// Creates an engine with an empty allocation and the wallet reserved.
    ///
    /// Negative totals are treated as zero.
    pub fn new(
        policies: Arc<PolicyTable>,
        payable_total: Money,
        membership: MembershipBalance,
    ) -> Self {
        let mut engine = AllocationEngine {
            policies,
            allocation: PaymentAllocation::new(),
            payable_total: payable_total.non_negative(),
            membership,
            mode: PaymentMode::Single,
            selected_method: None,
        };
        engine.recompute();
        engine
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// The cart total changed; re-reserve the wallet.
    pub fn set_payable_total(&mut self, payable_total: Money) {
        if payable_total.is_negative() {
            warn!(total = %payable_total, "Negative payable total clamped to zero");
        }
        self.payable_total = payable_total.non_negative();
        debug!(total = %self.payable_total, "Payable total updated");
        self.recompute();
    }

    /// The client (or their wallet) changed; re-reserve the wallet.
    pub fn set_membership_balance(&mut self, membership: MembershipBalance) {
        self.membership = membership;
        debug!(
            balance = %membership.current_balance,
            active = membership.is_active,
            "Membership balance updated"
        );
        self.recompute();
    }

    /// Re-derives everything that depends on the inputs.
    ///
    /// Idempotent: calling it twice leaves the same state as calling it once.
    pub fn recompute(&mut self) {
        self.reserve_membership();
    }

    /// `membership = min(payable_total, spendable balance)`.
    pub fn reserve_membership(&mut self) {
        let usage = self.payable_total.min(self.membership.spendable());
        if usage != self.allocation.membership() {
            debug!(usage = %usage, "Membership reservation changed");
        }
        self.allocation.set(PaymentMethod::Membership, usage);
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[inline]
    pub fn allocation(&self) -> &PaymentAllocation {
        &self.allocation
    }

    #[inline]
    pub fn payable_total(&self) -> Money {
        self.payable_total
    }

    #[inline]
    pub fn membership_balance(&self) -> &MembershipBalance {
        &self.membership
    }

    /// What the wallet currently covers.
    #[inline]
    pub fn membership_usage(&self) -> Money {
        self.allocation.membership()
    }

    /// What the client still owes after the wallet: never negative.
    pub fn client_to_pay(&self) -> Money {
        self.payable_total.saturating_sub_zero(self.membership_usage())
    }

    /// Sum of every non-wallet method.
    pub fn non_membership_total(&self) -> Money {
        self.allocation.non_membership_total()
    }

    /// `client_to_pay - non_membership_total`. Negative means overpaid.
    pub fn remaining(&self) -> Money {
        self.client_to_pay() - self.non_membership_total()
    }

    #[inline]
    pub fn mode(&self) -> PaymentMode {
        self.mode
    }

    /// The method picked in single mode, if any.
    #[inline]
    pub fn selected_method(&self) -> Option<PaymentMethod> {
        self.selected_method
    }

    #[inline]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Sets one method's amount from cashier input.
    ///
    /// ## Behavior
    /// - Membership: ignored (engine-managed)
    /// - Value clamped to `[0, policy max]`
    /// - Split mode: also clamped to what the other methods leave open
    /// - Single mode with other amounts present and a positive value:
    ///   switches to split and applies as split
    /// - Single mode otherwise: other methods zeroed, value capped at
    ///   `client_to_pay`, method becomes the selected one
    pub fn set_amount(&mut self, method: PaymentMethod, value: Money) {
        if method.is_membership() {
            warn!("Ignoring caller write to membership amount");
            return;
        }
        if value.is_negative() {
            warn!(method = %method, value = %value, "Negative amount clamped to zero");
        }

        let value = self.policies.get(method).cap(value);

        if self.mode == PaymentMode::Single {
            let has_other_payments = PaymentMethod::ALL
                .into_iter()
                .filter(|m| *m != method && !m.is_membership())
                .any(|m| self.allocation.get(m).is_positive());

            if has_other_payments && value.is_positive() {
                debug!(method = %method, "Other payments present, switching to split mode");
                self.mode = PaymentMode::Split;
            } else {
                self.allocation.clear_non_membership();
                let amount = value.min(self.client_to_pay());
                self.allocation.set(method, amount);
                self.selected_method = Some(method);
                debug!(method = %method, amount = %amount, mode = "single", "Amount set");
                self.recompute();
                return;
            }
        }

        let others = self.non_membership_total() - self.allocation.get(method);
        let open = self.client_to_pay().saturating_sub_zero(others);
        let amount = value.min(open);
        self.allocation.set(method, amount);
        debug!(method = %method, amount = %amount, mode = "split", "Amount set");
        self.recompute();
    }

    /// Puts the whole client share on one method and leaves split mode.
    ///
    /// A capped method takes at most its cap; the rest stays open.
    pub fn set_single_method(&mut self, method: PaymentMethod) {
        if method.is_membership() {
            warn!("Membership cannot be selected as the single payment method");
            return;
        }

        self.allocation.clear_non_membership();
        let amount = self.policies.get(method).cap(self.client_to_pay());
        self.allocation.set(method, amount);
        self.mode = PaymentMode::Single;
        self.selected_method = Some(method);
        debug!(method = %method, amount = %amount, "Single payment method selected");
        self.recompute();
    }

    /// Splits the client share across cash, cards and UPI.
    ///
    /// Each method gets the same whole-unit share (floored), cash takes the
    /// remainder. Whatever a capped method cannot hold moves to cash. BNPL is
    /// zeroed. Switches to split mode.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use tender_core::allocation::AllocationEngine;
    /// use tender_core::policy::PolicyTable;
    /// use tender_core::{MembershipBalance, Money, PaymentMethod};
    ///
    /// let mut engine = AllocationEngine::new(
    ///     Arc::new(PolicyTable::default()),
    ///     Money::from_major(1_002),
    ///     MembershipBalance::default(),
    /// );
    /// engine.distribute_equally();
    /// assert_eq!(engine.allocation().get(PaymentMethod::Cash), Money::from_major(252));
    /// assert_eq!(engine.allocation().get(PaymentMethod::Upi), Money::from_major(250));
    /// ```
    pub fn distribute_equally(&mut self) {
        let methods = PaymentMethod::ALWAYS_AVAILABLE;
        let client_to_pay = self.client_to_pay();
        let parts = methods.len() as i64;
        let share = Money::from_major(client_to_pay.cents() / (100 * parts));
        let mut leftover = client_to_pay - share * parts;

        self.allocation.clear_non_membership();
        for method in methods {
            let amount = self.policies.get(method).cap(share);
            leftover += share - amount;
            self.allocation.set(method, amount);
        }

        let first = methods[0];
        let first_amount = self.allocation.get(first) + leftover;
        self.allocation.set(first, self.policies.get(first).cap(first_amount));

        self.mode = PaymentMode::Split;
        self.selected_method = None;
        debug!(share = %share, total = %client_to_pay, "Distributed equally");
        self.recompute();
    }

    /// Zeroes every method except the wallet.
    pub fn clear_all(&mut self) {
        self.allocation.clear_non_membership();
        debug!("Cleared all payments");
        self.recompute();
    }

    /// Tops up the FIRST method in [cash, upi, credit_card, debit_card]
    /// that has room, then stops.
    ///
    /// A partial fill (cap reached) leaves the rest open on purpose; the
    /// planner is the component that walks every method.
    pub fn auto_balance_remaining(&mut self) {
        let still_to_pay = self.remaining();
        if !still_to_pay.is_positive() {
            debug!("Nothing left to balance");
            return;
        }

        for method in AUTO_BALANCE_ORDER {
            let current = self.allocation.get(method);
            let room = self
                .policies
                .get(method)
                .headroom(current)
                .unwrap_or(still_to_pay);
            let add = still_to_pay.min(room);

            if add.is_positive() {
                self.allocation.set(method, current + add);
                debug!(method = %method, added = %add, "Auto-balanced remaining amount");
                break;
            }
        }

        self.recompute();
    }

    /// Fills one method with a percentage of the client share, or with what
    /// is still open when no percentage is given.
    ///
    /// Percentages above 100 are treated as 100. The result is capped by
    /// policy; the method's previous amount is replaced.
    pub fn quick_fill(&mut self, method: PaymentMethod, percent: Option<u32>) {
        if method.is_membership() {
            warn!("Ignoring quick fill on membership");
            return;
        }

        let target = match percent {
            Some(pct) => self.client_to_pay().percentage(pct.min(100)),
            None => (self.allocation.get(method) + self.remaining()).non_negative(),
        };
        let amount = self.policies.get(method).cap(target);
        self.allocation.set(method, amount);
        debug!(method = %method, amount = %amount, percent = ?percent, "Quick fill");
        self.recompute();
    }

    /// Toggles split mode.
    ///
    /// Leaving split mode keeps amounts as they are; the next single-mode
    /// edit collapses them.
    pub fn set_split_mode(&mut self, split: bool) {
        self.mode = if split {
            self.selected_method = None;
            PaymentMode::Split
        } else {
            PaymentMode::Single
        };
        debug!(mode = ?self.mode, "Payment mode changed");
    }

    /// Takes over an allocation produced elsewhere (usually the planner).
    ///
    /// Amounts are capped by policy and the membership entry is replaced by
    /// the engine's own reservation.
    pub fn adopt(&mut self, allocation: PaymentAllocation) {
        let mut adopted = PaymentAllocation::new();
        for (method, amount) in allocation.iter().filter(|(m, _)| !m.is_membership()) {
            adopted.set(method, self.policies.get(method).cap(amount));
        }
        adopted.set(PaymentMethod::Membership, self.allocation.membership());
        self.allocation = adopted;

        let used: Vec<PaymentMethod> = adopted
            .positive()
            .map(|(m, _)| m)
            .filter(|m| !m.is_membership())
            .collect();
        match used.as_slice() {
            [single] => {
                self.mode = PaymentMode::Single;
                self.selected_method = Some(*single);
            }
            [] => {
                self.mode = PaymentMode::Single;
                self.selected_method = None;
            }
            _ => {
                self.mode = PaymentMode::Split;
                self.selected_method = None;
            }
        }

        debug!(methods = used.len(), "Adopted allocation");
        self.recompute();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
