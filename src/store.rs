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

//! Data-access collaborator.
//!
//! The ledger reads and mutates profiles, contracts and jobs only through a
//! [`StoreTx`] opened from a [`Store`]. A transaction sees its own staged
//! writes, publishes them atomically on [`StoreTx::commit`], and discards them
//! when dropped uncommitted. Implementations must isolate concurrent
//! transactions serializably: two transactions may not interleave a read of a
//! balance with a write of it.
//!
//! Predicates are plain data ([`ContractFilter`], [`JobFilter`]) so that any
//! backend can translate them; [`ContractFilter::matches`] and
//! [`JobFilter::matches`] give the reference semantics.

use crate::LedgerError;
use crate::base::{ContractId, JobId, ProfileId};
use crate::contract::{Contract, ContractStatus};
use crate::job::ContractedJob;
use crate::profile::Profile;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Which side(s) of a contract a profile must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Either(ProfileId),
    Client(ProfileId),
    Contractor(ProfileId),
}

impl Party {
    pub fn matches(&self, contract: &Contract) -> bool {
        match *self {
            Party::Either(id) => contract.involves(id),
            Party::Client(id) => contract.client_id == id,
            Party::Contractor(id) => contract.contractor_id == id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Is(ContractStatus),
    IsNot(ContractStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ContractStatus) -> bool {
        match *self {
            StatusFilter::Is(expected) => status == expected,
            StatusFilter::IsNot(excluded) => status != excluded,
        }
    }
}

/// Inclusive time range; a missing bound is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start) && self.end.is_none_or(|end| instant <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilter {
    pub id: Option<ContractId>,
    pub party: Option<Party>,
    pub status: Option<StatusFilter>,
}

impl ContractFilter {
    pub fn matches(&self, contract: &Contract) -> bool {
        self.id.is_none_or(|id| contract.id == id)
            && self.party.is_none_or(|party| party.matches(contract))
            && self.status.is_none_or(|status| status.matches(contract.status))
    }
}

/// Predicate over a job joined with its contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub id: Option<JobId>,
    pub paid: Option<bool>,
    /// Only paid jobs whose payment date falls in the range.
    pub paid_between: Option<DateRange>,
    pub contract: ContractFilter,
}

impl JobFilter {
    pub fn matches(&self, job: &ContractedJob) -> bool {
        self.id.is_none_or(|id| job.job.id == id)
            && self.paid.is_none_or(|paid| job.job.paid == paid)
            && self.paid_between.is_none_or(|range| {
                job.job.payment_date.is_some_and(|date| range.contains(date))
            })
            && self.contract.matches(&job.contract)
    }
}

/// A backend that can open transactions.
pub trait Store: Send + Sync {
    type Tx<'a>: StoreTx
    where
        Self: 'a;

    /// Opens a transaction. Blocks until no conflicting transaction is open.
    fn begin(&self) -> Result<Self::Tx<'_>, LedgerError>;
}

/// One atomic unit of work against a [`Store`].
pub trait StoreTx {
    /// Returns [`LedgerError::NotFound`] for unknown ids.
    fn get_profile(&self, id: ProfileId) -> Result<Profile, LedgerError>;

    fn update_profile_balance(
        &mut self,
        id: ProfileId,
        balance: Decimal,
    ) -> Result<(), LedgerError>;

    /// Contracts matching the filter, in ascending id order.
    fn find_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, LedgerError>;

    /// Jobs matching the filter, in ascending id order.
    fn find_jobs(&self, filter: &JobFilter) -> Result<Vec<ContractedJob>, LedgerError>;

    /// First job matching the filter, or [`LedgerError::NotFound`].
    fn find_job(&self, filter: &JobFilter) -> Result<ContractedJob, LedgerError> {
        self.find_jobs(filter)?
            .into_iter()
            .next()
            .ok_or(LedgerError::NotFound)
    }

    /// Sum of prices of matching jobs; zero when nothing matches.
    fn sum_job_prices(&self, filter: &JobFilter) -> Result<Decimal, LedgerError> {
        Ok(self
            .find_jobs(filter)?
            .iter()
            .map(|found| found.job.price)
            .sum())
    }

    /// Marks an unpaid job as paid at `paid_at`. Fails if it is already paid.
    fn mark_job_paid(&mut self, id: JobId, paid_at: DateTime<Utc>) -> Result<(), LedgerError>;

    /// Publishes every staged write at once.
    fn commit(self) -> Result<(), LedgerError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn contract(status: ContractStatus) -> Contract {
        Contract {
            id: ContractId(3),
            terms: String::new(),
            status,
            client_id: ProfileId(2),
            contractor_id: ProfileId(6),
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn party_matches_requested_side() {
        let c = contract(ContractStatus::InProgress);
        assert!(Party::Either(ProfileId(6)).matches(&c));
        assert!(Party::Client(ProfileId(2)).matches(&c));
        assert!(!Party::Client(ProfileId(6)).matches(&c));
        assert!(Party::Contractor(ProfileId(6)).matches(&c));
    }

    #[test]
    fn status_filter_is_and_is_not() {
        let not_terminated = StatusFilter::IsNot(ContractStatus::Terminated);
        assert!(not_terminated.matches(ContractStatus::New));
        assert!(not_terminated.matches(ContractStatus::InProgress));
        assert!(!not_terminated.matches(ContractStatus::Terminated));
        assert!(StatusFilter::Is(ContractStatus::New).matches(ContractStatus::New));
    }

    #[test]
    fn date_range_is_inclusive_and_open_ended() {
        let range = DateRange::new(Some(at(10)), Some(at(15)));
        assert!(range.contains(at(10)));
        assert!(range.contains(at(15)));
        assert!(!range.contains(at(16)));
        assert!(DateRange::default().contains(at(1)));
        assert!(DateRange::new(None, Some(at(15))).contains(at(1)));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let job = ContractedJob {
            job: Job::new(JobId(1), ContractId(3), dec!(10)),
            contract: contract(ContractStatus::Terminated),
        };
        assert!(JobFilter::default().matches(&job));
    }

    #[test]
    fn paid_between_excludes_unpaid_jobs() {
        let mut job = ContractedJob {
            job: Job::new(JobId(1), ContractId(3), dec!(10)),
            contract: contract(ContractStatus::InProgress),
        };
        let filter = JobFilter {
            paid_between: Some(DateRange::default()),
            ..Default::default()
        };
        assert!(!filter.matches(&job));

        job.job.paid = true;
        job.job.payment_date = Some(at(12));
        assert!(filter.matches(&job));
    }

    #[test]
    fn job_filter_combines_contract_predicates() {
        let job = ContractedJob {
            job: Job::new(JobId(7), ContractId(3), dec!(10)),
            contract: contract(ContractStatus::InProgress),
        };
        let filter = JobFilter {
            id: Some(JobId(7)),
            paid: Some(false),
            contract: ContractFilter {
                party: Some(Party::Either(ProfileId(2))),
                status: Some(StatusFilter::Is(ContractStatus::InProgress)),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(filter.matches(&job));

        let stranger = JobFilter {
            contract: ContractFilter {
                party: Some(Party::Either(ProfileId(99))),
                ..Default::default()
            },
            ..filter
        };
        assert!(!stranger.matches(&job));
    }
}
