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

//! In-memory [`Store`].
//!
//! All tables live behind one [`Mutex`]. A [`MemoryTx`] holds the guard for
//! its whole lifetime, so transactions run one at a time and are trivially
//! serializable. Writes are staged in the transaction and only copied into
//! the tables on commit; dropping the transaction discards them.

use crate::LedgerError;
use crate::base::{ContractId, JobId, ProfileId};
use crate::contract::Contract;
use crate::job::{ContractedJob, Job};
use crate::profile::Profile;
use crate::seed::{Seed, SeedError};
use crate::store::{ContractFilter, JobFilter, Store, StoreTx};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
struct Tables {
    profiles: BTreeMap<ProfileId, Profile>,
    contracts: BTreeMap<ContractId, Contract>,
    jobs: BTreeMap<JobId, Job>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a validated seed document.
    pub fn from_seed(seed: Seed) -> Result<Self, SeedError> {
        seed.validate()?;
        let store = Self::new();
        {
            let mut tables = store.tables.lock();
            tables.profiles = seed.profiles.into_iter().map(|p| (p.id, p)).collect();
            tables.contracts = seed.contracts.into_iter().map(|c| (c.id, c)).collect();
            tables.jobs = seed.jobs.into_iter().map(|j| (j.id, j)).collect();
        }
        Ok(store)
    }

    /// Inserts or replaces a profile outside of any transaction.
    pub fn insert_profile(&self, profile: Profile) {
        self.tables.lock().profiles.insert(profile.id, profile);
    }

    pub fn insert_contract(&self, contract: Contract) {
        self.tables.lock().contracts.insert(contract.id, contract);
    }

    pub fn insert_job(&self, job: Job) {
        self.tables.lock().jobs.insert(job.id, job);
    }

    /// Snapshot of every profile in ascending id order.
    pub fn profiles(&self) -> Vec<Profile> {
        self.tables.lock().profiles.values().cloned().collect()
    }

    pub fn job(&self, id: JobId) -> Option<Job> {
        self.tables.lock().jobs.get(&id).cloned()
    }

    pub fn profile(&self, id: ProfileId) -> Option<Profile> {
        self.tables.lock().profiles.get(&id).cloned()
    }
}

impl Store for MemoryStore {
    type Tx<'a> = MemoryTx<'a>;

    fn begin(&self) -> Result<MemoryTx<'_>, LedgerError> {
        Ok(MemoryTx {
            tables: self.tables.lock(),
            balances: HashMap::new(),
            payments: HashMap::new(),
        })
    }
}

/// Exclusive transaction over a [`MemoryStore`].
pub struct MemoryTx<'a> {
    tables: MutexGuard<'a, Tables>,
    /// Staged balance writes.
    balances: HashMap<ProfileId, Decimal>,
    /// Staged paid transitions.
    payments: HashMap<JobId, DateTime<Utc>>,
}

impl MemoryTx<'_> {
    /// Job as this transaction sees it, staged payment applied.
    fn staged_job(&self, job: &Job) -> Job {
        let mut job = job.clone();
        if let Some(paid_at) = self.payments.get(&job.id) {
            job.paid = true;
            job.payment_date = Some(*paid_at);
        }
        job
    }
}

impl StoreTx for MemoryTx<'_> {
    fn get_profile(&self, id: ProfileId) -> Result<Profile, LedgerError> {
        let mut profile = self
            .tables
            .profiles
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound)?;
        if let Some(balance) = self.balances.get(&id) {
            profile.balance = *balance;
        }
        Ok(profile)
    }

    fn update_profile_balance(
        &mut self,
        id: ProfileId,
        balance: Decimal,
    ) -> Result<(), LedgerError> {
        if !self.tables.profiles.contains_key(&id) {
            return Err(LedgerError::Storage(format!(
                "cannot update balance of unknown profile {id}"
            )));
        }
        if balance < Decimal::ZERO {
            return Err(LedgerError::Storage(format!(
                "refusing negative balance {balance} for profile {id}"
            )));
        }
        self.balances.insert(id, balance);
        Ok(())
    }

    fn find_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, LedgerError> {
        Ok(self
            .tables
            .contracts
            .values()
            .filter(|contract| filter.matches(contract))
            .cloned()
            .collect())
    }

    fn find_jobs(&self, filter: &JobFilter) -> Result<Vec<ContractedJob>, LedgerError> {
        let mut found = Vec::new();
        for job in self.tables.jobs.values() {
            // Jobs whose contract is missing never satisfy a join.
            let Some(contract) = self.tables.contracts.get(&job.contract_id) else {
                continue;
            };
            let joined = ContractedJob {
                job: self.staged_job(job),
                contract: contract.clone(),
            };
            if filter.matches(&joined) {
                found.push(joined);
            }
        }
        Ok(found)
    }

    fn mark_job_paid(&mut self, id: JobId, paid_at: DateTime<Utc>) -> Result<(), LedgerError> {
        let job = self
            .tables
            .jobs
            .get(&id)
            .ok_or_else(|| LedgerError::Storage(format!("cannot mark unknown job {id} paid")))?;
        if job.paid || self.payments.contains_key(&id) {
            return Err(LedgerError::Storage(format!("job {id} is already paid")));
        }
        self.payments.insert(id, paid_at);
        Ok(())
    }

    fn commit(mut self) -> Result<(), LedgerError> {
        let tables = &mut *self.tables;
        for (id, balance) in self.balances.drain() {
            if let Some(profile) = tables.profiles.get_mut(&id) {
                profile.balance = balance;
            }
        }
        for (id, paid_at) in self.payments.drain() {
            if let Some(job) = tables.jobs.get_mut(&id) {
                job.paid = true;
                job.payment_date = Some(paid_at);
            }
        }
        Ok(())
    }
}
