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

//! Ledger engine.
//!
//! The [`Engine`] runs every operation inside a single store transaction, so
//! either all of its writes land or none do.
//!
//! # Operations
//!
//! - **Payment**: moves a job's price from the paying client to the
//!   contractor and marks the job paid.
//! - **Deposit**: tops up a balance, capped at 25% of what the client owes on
//!   in-progress contracts.
//! - **Lookups**: contracts and unpaid jobs of a profile, admin reports.
//!
//! # Concurrency
//!
//! The engine holds no state of its own besides the store. Isolation between
//! concurrent requests is whatever the store's transactions provide, which
//! [`Store`] requires to be serializable.

use crate::LedgerError;
use crate::amount::parse_amount;
use crate::base::{ContractId, JobId, ProfileId};
use crate::contract::Contract;
use crate::error::DepositRejection;
use crate::job::Job;
use crate::profile::Profile;
use crate::query;
use crate::report::{self, ClientSpend, ProfessionEarnings};
use crate::store::{ContractFilter, DateRange, Party, Store, StoreTx};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Share of the outstanding obligations a client may hold above them.
pub const DEPOSIT_CAP_RATIO: Decimal = dec!(0.25);

/// Outcome of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub job_id: JobId,
    pub client_id: ProfileId,
    pub contractor_id: ProfileId,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Outcome of a successful deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub profile_id: ProfileId,
    pub requested: Decimal,
    /// What was actually credited; at most `requested`.
    pub applied: Decimal,
    pub balance: Decimal,
}

/// Computes how much of `requested` may be credited to a profile holding
/// `balance` whose client owes `total_owed`.
///
/// ```
/// use job_ledger_rs::deposit_allowance;
/// use rust_decimal_macros::dec;
///
/// // owes 400, holds 400: cap is 100, nothing deposited yet
/// assert_eq!(deposit_allowance(dec!(400), dec!(400), dec!(500)), Ok(dec!(100)));
/// ```
pub fn deposit_allowance(
    total_owed: Decimal,
    balance: Decimal,
    requested: Decimal,
) -> Result<Decimal, DepositRejection> {
    let max_deposit = total_owed * DEPOSIT_CAP_RATIO;
    if max_deposit <= Decimal::ZERO {
        return Err(DepositRejection::NoObligations);
    }

    let current_deposit = balance - total_owed;
    if current_deposit >= max_deposit {
        return Err(DepositRejection::LimitReached);
    }

    let remaining = max_deposit - current_deposit;
    Ok(remaining.min(requested))
}

/// Ledger engine over a [`Store`].
pub struct Engine<S> {
    store: S,
    clock: fn() -> DateTime<Utc>,
}

impl<S: Store> Engine<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Utc::now)
    }

    /// Uses `clock` for payment timestamps.
    pub fn with_clock(store: S, clock: fn() -> DateTime<Utc>) -> Self {
        Engine { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs `work` in one transaction, committing only if it succeeds.
    fn transaction<'s, T, F>(&'s self, work: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut S::Tx<'s>) -> Result<T, LedgerError>,
    {
        let mut tx = self.store.begin()?;
        let value = work(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Resolves a caller id to its profile.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] - No such profile.
    pub fn authenticate(&self, id: ProfileId) -> Result<Profile, LedgerError> {
        self.transaction(|tx| match tx.get_profile(id) {
            Err(LedgerError::NotFound) => Err(LedgerError::Unauthorized),
            other => other,
        })
    }

    pub fn profile(&self, id: ProfileId) -> Result<Profile, LedgerError> {
        self.transaction(|tx| tx.get_profile(id))
    }

    /// A contract the profile is a party to.
    pub fn contract(&self, id: ContractId, profile: &Profile) -> Result<Contract, LedgerError> {
        self.transaction(|tx| {
            tx.find_contracts(&ContractFilter {
                id: Some(id),
                party: Some(Party::Either(profile.id)),
                ..Default::default()
            })?
            .into_iter()
            .next()
            .ok_or(LedgerError::NotFound)
        })
    }

    /// Non-terminated contracts of the profile.
    pub fn contracts_for(&self, profile: &Profile) -> Result<Vec<Contract>, LedgerError> {
        self.transaction(|tx| query::find_payable_contracts_for(&*tx, profile.id))
    }

    /// Unpaid jobs on the profile's in-progress contracts.
    pub fn unpaid_jobs(&self, profile: &Profile) -> Result<Vec<Job>, LedgerError> {
        self.transaction(|tx| query::find_unpaid_jobs(&*tx, profile.id))
    }

    /// Pays for a job, moving its price from the payer to the contractor.
    ///
    /// Both balances are read inside the transaction, so the `payer` snapshot
    /// passed in only identifies the caller.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] - No unpaid job with this id on an
    ///   in-progress contract the payer is party to. Paying twice lands here.
    /// - [`LedgerError::PaymentRejected`] - Payer is not a client, or its
    ///   balance is below the price.
    /// - [`LedgerError::Storage`] - Store failure; nothing was changed.
    pub fn pay_for_job(&self, job_id: JobId, payer: &Profile) -> Result<Payment, LedgerError> {
        let result = self.transaction(|tx| {
            let found = query::find_payable_job(&*tx, job_id, payer.id)?;
            let price = found.job.price;
            let contractor_id = found.contract.contractor_id;

            let mut client = tx.get_profile(payer.id)?;
            if !client.can_pay(price) {
                return Err(LedgerError::PaymentRejected);
            }
            client.debit(price)?;
            tx.update_profile_balance(client.id, client.balance)?;

            // Re-read after the debit so a self-contract still conserves money.
            let mut contractor = tx.get_profile(contractor_id)?;
            contractor.credit(price)?;
            tx.update_profile_balance(contractor.id, contractor.balance)?;

            // Stamped under the transaction so dates follow commit order.
            let paid_at = (self.clock)();
            tx.mark_job_paid(job_id, paid_at)?;

            Ok(Payment {
                job_id,
                client_id: client.id,
                contractor_id,
                amount: price,
                paid_at,
            })
        });

        match &result {
            Ok(payment) => info!(
                job = %payment.job_id,
                client = %payment.client_id,
                contractor = %payment.contractor_id,
                amount = %payment.amount,
                "job paid"
            ),
            Err(err) => debug!(job = %job_id, payer = %payer.id, %err, "payment refused"),
        }
        result
    }

    /// Deposits into the requesting profile's balance, capped by what
    /// `target` owes on in-progress contracts.
    ///
    /// The amount credited may be smaller than `amount`; see
    /// [`deposit_allowance`].
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidArgument`] - `amount` is not positive.
    /// - [`LedgerError::DepositRejected`] - Nothing owed, or cap already met.
    /// - [`LedgerError::NotFound`] - Requesting profile no longer exists.
    /// - [`LedgerError::Storage`] - Store failure; nothing was changed.
    pub fn deposit_for_client(
        &self,
        target: ProfileId,
        requester: &Profile,
        amount: Decimal,
    ) -> Result<Deposit, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidArgument(format!(
                "amount must be positive, got {amount}"
            )));
        }

        let result = self.transaction(|tx| {
            let total_owed = query::sum_outstanding_job_prices(&*tx, target)?;
            let mut profile = tx.get_profile(requester.id)?;
            let applied = deposit_allowance(total_owed, profile.balance, amount)?;

            profile.credit(applied)?;
            tx.update_profile_balance(profile.id, profile.balance)?;

            Ok(Deposit {
                profile_id: profile.id,
                requested: amount,
                applied,
                balance: profile.balance,
            })
        });

        match &result {
            Ok(deposit) => info!(
                profile = %deposit.profile_id,
                target = %target,
                requested = %deposit.requested,
                applied = %deposit.applied,
                "deposit applied"
            ),
            Err(err) => debug!(profile = %requester.id, target = %target, %err, "deposit refused"),
        }
        result
    }

    /// [`Engine::deposit_for_client`] with an amount taken from a request body.
    pub fn deposit_value(
        &self,
        target: ProfileId,
        requester: &Profile,
        amount: &Value,
    ) -> Result<Deposit, LedgerError> {
        let amount = parse_amount(amount)?;
        self.deposit_for_client(target, requester, amount)
    }

    pub fn best_profession(&self, range: DateRange) -> Result<ProfessionEarnings, LedgerError> {
        self.transaction(|tx| report::best_profession(&*tx, range))
    }

    pub fn best_clients(
        &self,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<ClientSpend>, LedgerError> {
        self.transaction(|tx| report::best_clients(&*tx, range, limit))
    }
}
