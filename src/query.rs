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

//! Ledger queries.
//!
//! Read-only primitives shared by the payment and deposit operations and by
//! the listing endpoints. Every function runs inside the caller's transaction.

use crate::LedgerError;
use crate::base::{JobId, ProfileId};
use crate::contract::{Contract, ContractStatus};
use crate::job::{ContractedJob, Job};
use crate::store::{ContractFilter, JobFilter, Party, StatusFilter, StoreTx};
use rust_decimal::Decimal;

/// Contracts where `profile` is client or contractor and which are not
/// terminated.
pub fn find_payable_contracts_for<T: StoreTx>(
    tx: &T,
    profile: ProfileId,
) -> Result<Vec<Contract>, LedgerError> {
    tx.find_contracts(&ContractFilter {
        party: Some(Party::Either(profile)),
        status: Some(StatusFilter::IsNot(ContractStatus::Terminated)),
        ..Default::default()
    })
}

fn unpaid_active_jobs_of(profile: ProfileId) -> JobFilter {
    JobFilter {
        paid: Some(false),
        contract: ContractFilter {
            party: Some(Party::Either(profile)),
            status: Some(StatusFilter::Is(ContractStatus::InProgress)),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Unpaid jobs on in-progress contracts that `profile` is a party to.
pub fn find_unpaid_jobs<T: StoreTx>(tx: &T, profile: ProfileId) -> Result<Vec<Job>, LedgerError> {
    Ok(tx
        .find_jobs(&unpaid_active_jobs_of(profile))?
        .into_iter()
        .map(|found| found.job)
        .collect())
}

/// The unpaid job `job_id`, provided its contract is in progress and
/// `profile` is a party to it.
///
/// A paid job, a job on an inactive contract, and a job belonging to someone
/// else are all indistinguishable from a missing one.
pub fn find_payable_job<T: StoreTx>(
    tx: &T,
    job_id: JobId,
    profile: ProfileId,
) -> Result<ContractedJob, LedgerError> {
    tx.find_job(&JobFilter {
        id: Some(job_id),
        ..unpaid_active_jobs_of(profile)
    })
}

/// Sum of prices of every job on the client's in-progress contracts, paid
/// or not. Zero when there are none.
pub fn sum_outstanding_job_prices<T: StoreTx>(
    tx: &T,
    client: ProfileId,
) -> Result<Decimal, LedgerError> {
    tx.sum_job_prices(&JobFilter {
        contract: ContractFilter {
            party: Some(Party::Client(client)),
            status: Some(StatusFilter::Is(ContractStatus::InProgress)),
            ..Default::default()
        },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ContractId;
    use crate::memory::MemoryStore;
    use crate::profile::{Profile, ProfileType};
    use crate::store::Store;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    // Client 1 has contracts with contractors 5 (terminated), 6 (in progress)
    // and 7 (new). Client 2 has one in-progress contract with contractor 6.
    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, kind) in [
            (1, ProfileType::Client),
            (2, ProfileType::Client),
            (5, ProfileType::Contractor),
            (6, ProfileType::Contractor),
            (7, ProfileType::Contractor),
        ] {
            store.insert_profile(Profile::new(ProfileId(id), kind, dec!(100)));
        }
        for (id, client, contractor, status) in [
            (1, 1, 5, ContractStatus::Terminated),
            (2, 1, 6, ContractStatus::InProgress),
            (3, 1, 7, ContractStatus::New),
            (4, 2, 6, ContractStatus::InProgress),
        ] {
            store.insert_contract(Contract {
                id: ContractId(id),
                terms: String::new(),
                status,
                client_id: ProfileId(client),
                contractor_id: ProfileId(contractor),
            });
        }
        for (id, contract, price, paid) in [
            (1, 1, dec!(200), false),
            (2, 2, dec!(201), false),
            (3, 2, dec!(50), true),
            (4, 3, dec!(300), false),
            (5, 4, dec!(202), false),
        ] {
            let mut job = Job::new(JobId(id), ContractId(contract), price);
            if paid {
                job.paid = true;
                job.payment_date = Some(Utc::now());
            }
            store.insert_job(job);
        }
        store
    }

    fn ids<I: IntoIterator<Item = u32>>(ids: I) -> Vec<u32> {
        ids.into_iter().collect()
    }

    #[test]
    fn payable_contracts_exclude_terminated() {
        let store = store();
        let tx = store.begin().unwrap();

        let client = find_payable_contracts_for(&tx, ProfileId(1)).unwrap();
        assert_eq!(ids(client.iter().map(|c| c.id.0)), vec![2, 3]);

        let contractor = find_payable_contracts_for(&tx, ProfileId(6)).unwrap();
        assert_eq!(ids(contractor.iter().map(|c| c.id.0)), vec![2, 4]);

        assert!(find_payable_contracts_for(&tx, ProfileId(5)).unwrap().is_empty());
    }

    #[test]
    fn unpaid_jobs_only_on_in_progress_contracts() {
        let store = store();
        let tx = store.begin().unwrap();

        let jobs = find_unpaid_jobs(&tx, ProfileId(1)).unwrap();
        assert_eq!(ids(jobs.iter().map(|j| j.id.0)), vec![2]);

        let jobs = find_unpaid_jobs(&tx, ProfileId(6)).unwrap();
        assert_eq!(ids(jobs.iter().map(|j| j.id.0)), vec![2, 5]);
    }

    #[test]
    fn payable_job_requires_party_and_unpaid() {
        let store = store();
        let tx = store.begin().unwrap();

        assert!(find_payable_job(&tx, JobId(2), ProfileId(1)).is_ok());
        assert!(find_payable_job(&tx, JobId(2), ProfileId(6)).is_ok());
        assert_eq!(
            find_payable_job(&tx, JobId(2), ProfileId(2)),
            Err(LedgerError::NotFound)
        );
        // paid
        assert_eq!(
            find_payable_job(&tx, JobId(3), ProfileId(1)),
            Err(LedgerError::NotFound)
        );
        // terminated and new contracts
        assert_eq!(
            find_payable_job(&tx, JobId(1), ProfileId(1)),
            Err(LedgerError::NotFound)
        );
        assert_eq!(
            find_payable_job(&tx, JobId(4), ProfileId(1)),
            Err(LedgerError::NotFound)
        );
    }

    #[test]
    fn outstanding_sum_includes_paid_jobs_of_active_contracts() {
        let store = store();
        let tx = store.begin().unwrap();

        assert_eq!(
            sum_outstanding_job_prices(&tx, ProfileId(1)).unwrap(),
            dec!(251)
        );
        assert_eq!(
            sum_outstanding_job_prices(&tx, ProfileId(2)).unwrap(),
            dec!(202)
        );
    }

    #[test]
    fn outstanding_sum_is_zero_without_jobs() {
        let store = store();
        let tx = store.begin().unwrap();

        // contractor side does not count, unknown profiles owe nothing
        assert_eq!(
            sum_outstanding_job_prices(&tx, ProfileId(6)).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            sum_outstanding_job_prices(&tx, ProfileId(99)).unwrap(),
            Decimal::ZERO
        );
    }
}
