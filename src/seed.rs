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

//! Seed documents used to populate a store at startup.
//!
//! ```json
//! {
//!   "profiles":  [{"id": 1, "firstName": "Harry", "lastName": "Potter",
//!                  "profession": "Wizard", "balance": "1150", "type": "client"}],
//!   "contracts": [{"id": 1, "terms": "...", "status": "in_progress",
//!                  "clientId": 1, "contractorId": 5}],
//!   "jobs":      [{"id": 1, "description": "work", "price": "200",
//!                  "contractId": 1}]
//! }
//! ```

use crate::base::{ContractId, JobId, ProfileId};
use crate::contract::Contract;
use crate::job::Job;
use crate::profile::{Profile, ProfileType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("malformed seed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate profile id {0}")]
    DuplicateProfile(ProfileId),

    #[error("duplicate contract id {0}")]
    DuplicateContract(ContractId),

    #[error("duplicate job id {0}")]
    DuplicateJob(JobId),

    #[error("profile {0} has a negative balance")]
    NegativeBalance(ProfileId),

    #[error("contract {contract} references {role} {profile} which is missing or of the wrong type")]
    BadParty {
        contract: ContractId,
        role: ProfileType,
        profile: ProfileId,
    },

    #[error("job {job} references unknown contract {contract}")]
    UnknownContract { job: JobId, contract: ContractId },

    #[error("job {0} must have a positive price and a payment date iff paid")]
    InconsistentJob(JobId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Seed {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks uniqueness of ids, referential integrity, and the per-entity
    /// invariants.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut kinds = HashMap::new();
        for profile in &self.profiles {
            if kinds.insert(profile.id, profile.kind).is_some() {
                return Err(SeedError::DuplicateProfile(profile.id));
            }
            if profile.balance < Decimal::ZERO {
                return Err(SeedError::NegativeBalance(profile.id));
            }
        }

        let mut contracts = HashSet::new();
        for contract in &self.contracts {
            if !contracts.insert(contract.id) {
                return Err(SeedError::DuplicateContract(contract.id));
            }
            for (role, profile) in [
                (ProfileType::Client, contract.client_id),
                (ProfileType::Contractor, contract.contractor_id),
            ] {
                if kinds.get(&profile) != Some(&role) {
                    return Err(SeedError::BadParty {
                        contract: contract.id,
                        role,
                        profile,
                    });
                }
            }
        }

        let mut jobs = HashSet::new();
        for job in &self.jobs {
            if !jobs.insert(job.id) {
                return Err(SeedError::DuplicateJob(job.id));
            }
            if !contracts.contains(&job.contract_id) {
                return Err(SeedError::UnknownContract {
                    job: job.id,
                    contract: job.contract_id,
                });
            }
            if !job.is_consistent() {
                return Err(SeedError::InconsistentJob(job.id));
            }
        }

        Ok(())
    }
}
