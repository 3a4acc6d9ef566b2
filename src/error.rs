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

//! Error types for ledger operations.

use thiserror::Error;

/// Why a deposit was refused.
///
/// The two reasons are surfaced verbatim to callers and must stay
/// distinguishable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositRejection {
    /// The client owes nothing on in-progress contracts, so the cap is zero.
    #[error("no jobs in progress or client has paid enough")]
    NoObligations,

    /// The balance held above what is owed already meets the cap.
    #[error("deposit limit reached")]
    LimitReached,
}

/// Ledger errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Entity is absent, or the caller is not a party to it
    #[error("not found")]
    NotFound,

    /// Payer is not a client, or cannot cover the job price
    #[error("insufficient funds or not a client")]
    PaymentRejected,

    /// Deposit refused by the cap rules
    #[error("{0}")]
    DepositRejected(DepositRejection),

    /// Malformed input, e.g. a non-numeric or non-positive amount
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller could not be resolved to a profile
    #[error("unauthorized")]
    Unauthorized,

    /// Underlying store failed; the operation had no effect
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DepositRejection> for LedgerError {
    fn from(reason: DepositRejection) -> Self {
        LedgerError::DepositRejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(LedgerError::NotFound.to_string(), "not found");
        assert_eq!(
            LedgerError::PaymentRejected.to_string(),
            "insufficient funds or not a client"
        );
        assert_eq!(
            LedgerError::DepositRejected(DepositRejection::NoObligations).to_string(),
            "no jobs in progress or client has paid enough"
        );
        assert_eq!(
            LedgerError::DepositRejected(DepositRejection::LimitReached).to_string(),
            "deposit limit reached"
        );
        assert_eq!(
            LedgerError::InvalidArgument("amount".into()).to_string(),
            "invalid argument: amount"
        );
        assert_eq!(LedgerError::Unauthorized.to_string(), "unauthorized");
        assert_eq!(
            LedgerError::Storage("disk on fire".into()).to_string(),
            "storage error: disk on fire"
        );
    }

    #[test]
    fn deposit_reasons_are_distinguishable() {
        assert_ne!(
            DepositRejection::NoObligations.to_string(),
            DepositRejection::LimitReached.to_string()
        );
    }

    #[test]
    fn rejection_converts_into_ledger_error() {
        let err: LedgerError = DepositRejection::LimitReached.into();
        assert_eq!(
            err,
            LedgerError::DepositRejected(DepositRejection::LimitReached)
        );
    }
}
