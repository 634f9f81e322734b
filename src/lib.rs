pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Account, AccountId, Decimal, Deposit, DepositStatus, ReferralLayer, ReferralPayout, Rig,
    RigCatalog, RigId, RigStatus, TimeMs, Withdrawal, WithdrawalStatus,
};
pub use engine::{AccrualScheduler, TickReport};
pub use error::AppError;
