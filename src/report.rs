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

//! Admin reports over paid jobs.

use crate::LedgerError;
use crate::base::ProfileId;
use crate::store::{DateRange, JobFilter, StoreTx};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Number of clients returned by [`best_clients`] when no limit is given.
pub const DEFAULT_BEST_CLIENTS_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionEarnings {
    pub profession: String,
    pub earned: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSpend {
    pub id: ProfileId,
    pub full_name: String,
    pub paid: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date.
///
/// A bare date as [`Bound::End`] covers the whole day.
pub fn parse_bound(text: &str, bound: Bound) -> Result<DateTime<Utc>, LedgerError> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidArgument(format!("not a date: {text:?}")))?;
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    Ok(match bound {
        Bound::Start => midnight,
        Bound::End => midnight + Duration::days(1) - Duration::milliseconds(1),
    })
}

fn paid_in(range: DateRange) -> JobFilter {
    JobFilter {
        paid: Some(true),
        paid_between: Some(range),
        ..Default::default()
    }
}

/// The contractor profession with the highest earnings from jobs paid in
/// `range`. Ties go to the alphabetically first profession.
pub fn best_profession<T: StoreTx>(
    tx: &T,
    range: DateRange,
) -> Result<ProfessionEarnings, LedgerError> {
    let mut professions: HashMap<ProfileId, String> = HashMap::new();
    let mut earned: BTreeMap<String, Decimal> = BTreeMap::new();

    for found in tx.find_jobs(&paid_in(range))? {
        let contractor = found.contract.contractor_id;
        let profession = match professions.get(&contractor) {
            Some(profession) => profession.clone(),
            None => {
                let profession = tx.get_profile(contractor)?.profession;
                professions.insert(contractor, profession.clone());
                profession
            }
        };
        *earned.entry(profession).or_default() += found.job.price;
    }

    earned
        .into_iter()
        .fold(None::<ProfessionEarnings>, |best, (profession, total)| match best {
            Some(best) if best.earned >= total => Some(best),
            _ => Some(ProfessionEarnings {
                profession,
                earned: total,
            }),
        })
        .ok_or(LedgerError::NotFound)
}

/// Clients ranked by what they paid for jobs in `range`, highest first,
/// ties by ascending id.
pub fn best_clients<T: StoreTx>(
    tx: &T,
    range: DateRange,
    limit: usize,
) -> Result<Vec<ClientSpend>, LedgerError> {
    if limit == 0 {
        return Err(LedgerError::InvalidArgument("limit must be at least 1".into()));
    }

    let mut paid: BTreeMap<ProfileId, Decimal> = BTreeMap::new();
    for found in tx.find_jobs(&paid_in(range))? {
        *paid.entry(found.contract.client_id).or_default() += found.job.price;
    }

    let mut ranked: Vec<(ProfileId, Decimal)> = paid.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(limit);

    if ranked.is_empty() {
        return Err(LedgerError::NotFound);
    }

    ranked
        .into_iter()
        .map(|(id, paid)| {
            Ok(ClientSpend {
                id,
                full_name: tx.get_profile(id)?.full_name(),
                paid,
            })
        })
        .collect()
}
