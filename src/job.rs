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

//! Jobs: billable units of work under a contract.
//!
//! A job moves from unpaid to paid exactly once:
//!
//! ```text
//! Unpaid ──pay──► Paid (payment_date set)
//! ```
//!
//! There is no transition back.

use crate::base::{ContractId, JobId};
use crate::contract::Contract;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    pub contract_id: ContractId,
}

impl Job {
    pub fn new(id: JobId, contract_id: ContractId, price: Decimal) -> Self {
        Self {
            id,
            description: String::new(),
            price,
            paid: false,
            payment_date: None,
            contract_id,
        }
    }

    /// `payment_date` is set iff `paid`, and the price is positive.
    pub fn is_consistent(&self) -> bool {
        self.paid == self.payment_date.is_some() && self.price > Decimal::ZERO
    }
}

/// A job together with the contract that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractedJob {
    pub job: Job,
    pub contract: Contract,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_job_is_unpaid_and_consistent() {
        let job = Job::new(JobId(1), ContractId(1), dec!(200));
        assert!(!job.paid);
        assert!(job.payment_date.is_none());
        assert!(job.is_consistent());
    }

    #[test]
    fn paid_without_date_is_inconsistent() {
        let mut job = Job::new(JobId(1), ContractId(1), dec!(200));
        job.paid = true;
        assert!(!job.is_consistent());

        job.payment_date = Some(Utc::now());
        assert!(job.is_consistent());
    }

    #[test]
    fn zero_price_is_inconsistent() {
        assert!(!Job::new(JobId(1), ContractId(1), Decimal::ZERO).is_consistent());
    }

    #[test]
    fn deserializes_with_defaults() {
        let job: Job =
            serde_json::from_str(r#"{"id": 3, "price": "202", "contractId": 3}"#).unwrap();
        assert_eq!(job.price, dec!(202));
        assert!(!job.paid);
        assert_eq!(job.description, "");
    }
}
