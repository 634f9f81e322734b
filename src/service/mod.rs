//! Platform services: validated operations over the stores.
//!
//! Each service holds `Arc`s to its collaborators and exposes the public
//! operations the HTTP layer calls. Validation happens fully before any
//! write; multi-step writes go through the repository's transactional
//! operations so there is no partial mutation.

pub mod accounts;
pub mod rigs;
pub mod wallet;

pub use accounts::AccountService;
pub use rigs::RigService;
pub use wallet::WalletService;
