//! # Policy Configuration
//!
//! Loads the payment policy table once at process start.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     TENDER_UPI_MAX=200000                                               │
//! │     TENDER_BNPL_MIN=1000                                                │
//! │     TENDER_BNPL_MAX=75000                                               │
//! │     TENDER_CREDIT_CARD_FEE=1.8                                          │
//! │     TENDER_DEBIT_CARD_FEE=0.9                                           │
//! │                                                                         │
//! │  2. TOML Policy File                                                    │
//! │     ~/.config/tender/policies.toml (Linux)                              │
//! │     ~/Library/Application Support/com.tender.checkout/policies.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     PolicyTable::default()                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policy File Format
//! Amounts are in major units (rupees). A section that is present replaces
//! the default for that method entirely; a missing section keeps the default.
//! ```toml
//! # policies.toml
//! [upi]
//! max_amount = 100000
//! verification_threshold = 10000
//!
//! [bnpl]
//! min_amount = 500
//! max_amount = 50000
//! verification_threshold = 0
//!
//! [credit_card]
//! processing_fee_percent = 2.5
//! verification_threshold = 5000
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tender_core::{Money, PaymentMethod, PaymentMethodPolicy, PolicyTable};
use tracing::{debug, info, warn};

use crate::error::ConfigResult;

/// File name looked up in the platform config directory.
pub const POLICY_FILE_NAME: &str = "policies.toml";

// =============================================================================
// Method Section
// =============================================================================

/// One `[method]` section of the policy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodSection {
    /// Fee in percent (2.5 = 2.5%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_fee_percent: Option<Decimal>,

    /// Smallest accepted amount, major units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,

    /// Largest accepted amount, major units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,

    /// Amounts above this need extra verification, major units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_threshold: Option<Decimal>,
}

impl From<&PaymentMethodPolicy> for MethodSection {
    fn from(policy: &PaymentMethodPolicy) -> Self {
        MethodSection {
            processing_fee_percent: policy.processing_fee_percent,
            min_amount: policy.min_amount.map(|m| m.to_decimal()),
            max_amount: policy.max_amount.map(|m| m.to_decimal()),
            verification_threshold: policy.verification_threshold.map(|m| m.to_decimal()),
        }
    }
}

impl From<&MethodSection> for PaymentMethodPolicy {
    fn from(section: &MethodSection) -> Self {
        PaymentMethodPolicy {
            processing_fee_percent: section.processing_fee_percent,
            min_amount: section.min_amount.map(Money::from_decimal),
            max_amount: section.max_amount.map(Money::from_decimal),
            verification_threshold: section.verification_threshold.map(Money::from_decimal),
        }
    }
}

// =============================================================================
// Policy Config
// =============================================================================

/// The policy file as written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_cash")]
    pub cash: MethodSection,
    #[serde(default = "default_credit_card")]
    pub credit_card: MethodSection,
    #[serde(default = "default_debit_card")]
    pub debit_card: MethodSection,
    #[serde(default = "default_upi")]
    pub upi: MethodSection,
    #[serde(default = "default_bnpl")]
    pub bnpl: MethodSection,
    #[serde(default = "default_membership")]
    pub membership: MethodSection,
}

fn default_section(method: PaymentMethod) -> MethodSection {
    MethodSection::from(PolicyTable::default().get(method))
}

fn default_cash() -> MethodSection {
    default_section(PaymentMethod::Cash)
}

fn default_credit_card() -> MethodSection {
    default_section(PaymentMethod::CreditCard)
}

fn default_debit_card() -> MethodSection {
    default_section(PaymentMethod::DebitCard)
}

fn default_upi() -> MethodSection {
    default_section(PaymentMethod::Upi)
}

fn default_bnpl() -> MethodSection {
    default_section(PaymentMethod::Bnpl)
}

fn default_membership() -> MethodSection {
    default_section(PaymentMethod::Membership)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::from(&PolicyTable::default())
    }
}

impl From<&PolicyTable> for PolicyConfig {
    fn from(table: &PolicyTable) -> Self {
        PolicyConfig {
            cash: MethodSection::from(&table.cash),
            credit_card: MethodSection::from(&table.credit_card),
            debit_card: MethodSection::from(&table.debit_card),
            upi: MethodSection::from(&table.upi),
            bnpl: MethodSection::from(&table.bnpl),
            membership: MethodSection::from(&table.membership),
        }
    }
}

impl PolicyConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads the policy from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Replace with the TOML file if it exists (`path`, else the platform default)
    /// 3. Apply `TENDER_*` environment overrides
    /// 4. Validate the resulting table
    pub fn load(path: Option<PathBuf>) -> ConfigResult<PolicyTable> {
        let mut config = Self::default();

        if let Some(path) = path.or_else(Self::default_path) {
            if path.exists() {
                info!(?path, "Loading payment policy from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Policy file not found, using defaults");
            }
        }

        config.apply_env_overrides();

        let table = config.to_table();
        table.validate()?;

        info!(
            upi_max = ?table.upi.max_amount.map(|m| m.to_string()),
            bnpl_min = ?table.bnpl.min_amount.map(|m| m.to_string()),
            bnpl_max = ?table.bnpl.max_amount.map(|m| m.to_string()),
            "Payment policy loaded"
        );
        Ok(table)
    }

    /// Loads the policy, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<PathBuf>) -> PolicyTable {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load payment policy: {}. Using defaults.", e);
            PolicyTable::default()
        })
    }

    /// Writes the policy as pretty TOML, e.g. to seed a new install.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        info!(?path, "Payment policy saved");
        Ok(())
    }

    /// Converts the file representation into the runtime table.
    pub fn to_table(&self) -> PolicyTable {
        PolicyTable {
            cash: PaymentMethodPolicy::from(&self.cash),
            credit_card: PaymentMethodPolicy::from(&self.credit_card),
            debit_card: PaymentMethodPolicy::from(&self.debit_card),
            upi: PaymentMethodPolicy::from(&self.upi),
            bnpl: PaymentMethodPolicy::from(&self.bnpl),
            membership: PaymentMethodPolicy::from(&self.membership),
        }
    }

    // =========================================================================
    // Environment
    // =========================================================================

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Option<Decimal> {
            let raw = lookup(key)?;
            match Decimal::from_str(raw.trim()) {
                Ok(value) => {
                    debug!(key, value = %value, "Overriding policy from environment");
                    Some(value)
                }
                Err(_) => {
                    warn!(key, value = %raw, "Ignoring non-numeric policy override");
                    None
                }
            }
        };

        if let Some(max) = read("TENDER_UPI_MAX") {
            self.upi.max_amount = Some(max);
        }
        if let Some(min) = read("TENDER_BNPL_MIN") {
            self.bnpl.min_amount = Some(min);
        }
        if let Some(max) = read("TENDER_BNPL_MAX") {
            self.bnpl.max_amount = Some(max);
        }
        if let Some(fee) = read("TENDER_CREDIT_CARD_FEE") {
            self.credit_card.processing_fee_percent = Some(fee);
        }
        if let Some(fee) = read("TENDER_DEBIT_CARD_FEE") {
            self.debit_card.processing_fee_percent = Some(fee);
        }
    }

    /// Returns the default policy file path.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tender", "checkout")
            .map(|dirs| dirs.config_dir().join(POLICY_FILE_NAME))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
