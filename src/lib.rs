// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! # Job Ledger
//!
//! This library manages contracts, jobs and balances between clients and
//! contractors. Its core is the money-moving logic: paying for a job, and
//! depositing into a client balance up to a cap derived from what the client
//! owes.
//!
//! ## Core Components
//!
//! - [`Engine`]: Runs payments, deposits, lookups and reports, each in one transaction
//! - [`Store`] / [`StoreTx`]: Data-access seam the engine is written against
//! - [`MemoryStore`]: Serializable in-memory store
//! - [`Profile`], [`Contract`], [`Job`]: The ledger entities
//! - [`LedgerError`]: Error types for ledger failures
//! - [`api`]: HTTP routes over an engine
//!
//! ## Example
//!
//! ```
//! use job_ledger_rs::{
//!     Contract, ContractId, ContractStatus, Engine, Job, JobId, MemoryStore, Profile,
//!     ProfileId, ProfileType,
//! };
//! use rust_decimal_macros::dec;
//!
//! let store = MemoryStore::new();
//! store.insert_profile(Profile::new(ProfileId(1), ProfileType::Client, dec!(150)));
//! store.insert_profile(Profile::new(ProfileId(2), ProfileType::Contractor, dec!(0)));
//! store.insert_contract(Contract {
//!     id: ContractId(1),
//!     terms: String::new(),
//!     status: ContractStatus::InProgress,
//!     client_id: ProfileId(1),
//!     contractor_id: ProfileId(2),
//! });
//! store.insert_job(Job::new(JobId(1), ContractId(1), dec!(100)));
//!
//! let engine = Engine::new(store);
//! let client = engine.profile(ProfileId(1)).unwrap();
//! engine.pay_for_job(JobId(1), &client).unwrap();
//!
//! assert_eq!(engine.profile(ProfileId(1)).unwrap().balance, dec!(50));
//! assert_eq!(engine.profile(ProfileId(2)).unwrap().balance, dec!(100));
//! ```
//!
//! ## Thread Safety
//!
//! The engine is `Sync` whenever its store is; concurrent operations are
//! isolated by the store's transactions.

mod amount;
pub mod api;
mod base;
mod contract;
mod engine;
pub mod error;
mod job;
mod memory;
mod profile;
pub mod query;
pub mod report;
pub mod seed;
pub mod store;

pub use amount::parse_amount;
pub use base::{ContractId, JobId, ProfileId};
pub use contract::{Contract, ContractStatus};
pub use engine::{DEPOSIT_CAP_RATIO, Deposit, Engine, Payment, deposit_allowance};
pub use error::{DepositRejection, LedgerError};
pub use job::{ContractedJob, Job};
pub use memory::{MemoryStore, MemoryTx};
pub use profile::{Profile, ProfileType};
pub use seed::{Seed, SeedError};
pub use store::{ContractFilter, DateRange, JobFilter, Party, StatusFilter, Store, StoreTx};
