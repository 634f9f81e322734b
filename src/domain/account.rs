//! Accounts: owners of balances and referral relationships.

use crate::domain::{AccountId, Decimal, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account holding a balance and an optional referral parent.
///
/// The balance is mutated only through the ledger store's atomic
/// credit/debit operations and is never debited below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub balance: Decimal,
    pub referral_code: String,
    pub referred_by: Option<AccountId>,
    pub created_at: TimeMs,
}

impl Account {
    /// Create a new account with a zero balance and a fresh referral code.
    pub fn new(name: String, email: String, referred_by: Option<AccountId>) -> Self {
        Account {
            id: AccountId::generate(),
            name,
            email,
            balance: Decimal::zero(),
            referral_code: generate_referral_code(),
            referred_by,
            created_at: TimeMs::now(),
        }
    }
}

/// Short shareable referral code.
fn generate_referral_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..8].to_string()
}
