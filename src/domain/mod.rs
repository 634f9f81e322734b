//! Domain types: accounts, rigs, the catalog, and ledger records.

pub mod account;
pub mod catalog;
pub mod decimal;
pub mod deposit;
pub mod primitives;
pub mod referral;
pub mod rig;
pub mod withdrawal;

pub use account::Account;
pub use catalog::{daily_rate, RigCatalog, RigTier, MINING_DAYS};
pub use decimal::Decimal;
pub use deposit::{Deposit, DepositStatus};
pub use primitives::{AccountId, RigId, TimeMs, MS_PER_DAY};
pub use referral::{ReferralLayer, ReferralPayout};
pub use rig::{Rig, RigStatus};
pub use withdrawal::{Withdrawal, WithdrawalStatus};
