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

//! Profiles: the accounts that hold balances.
//!
//! A profile is either a client, who pays for jobs, or a contractor, who is
//! paid for them. Only the balance is mutated by this crate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use job_ledger_rs::{Profile, ProfileId, ProfileType};
//!
//! let mut client = Profile::new(ProfileId(1), ProfileType::Client, dec!(150));
//! client.debit(dec!(100)).unwrap();
//! assert_eq!(client.balance, dec!(50));
//! ```

use crate::LedgerError;
use crate::base::ProfileId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Client,
    Contractor,
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileType::Client => f.write_str("client"),
            ProfileType::Contractor => f.write_str("contractor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub balance: Decimal,
    #[serde(rename = "type")]
    pub kind: ProfileType,
}

impl Profile {
    /// Creates a profile with empty name fields.
    pub fn new(id: ProfileId, kind: ProfileType, balance: Decimal) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            profession: String::new(),
            balance,
            kind,
        }
    }

    pub fn is_client(&self) -> bool {
        self.kind == ProfileType::Client
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether this profile may pay `price`: it must be a client holding at
    /// least that much.
    pub fn can_pay(&self, price: Decimal) -> bool {
        self.is_client() && self.balance >= price
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of profile {} went negative: {}",
            self.id,
            self.balance
        );
    }

    /// Increases the balance.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidArgument(format!(
                "credit must be positive, got {amount}"
            )));
        }
        self.balance += amount;
        self.assert_invariants();
        Ok(())
    }

    /// Decreases the balance; refuses to go below zero.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidArgument(format!(
                "debit must be positive, got {amount}"
            )));
        }
        if self.balance < amount {
            return Err(LedgerError::PaymentRejected);
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }
}
