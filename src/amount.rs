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

//! Parsing of monetary amounts from loosely-typed request bodies.

use crate::LedgerError;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parses a strictly positive amount from a JSON number or numeric string.
///
/// Anything else (null, booleans, objects, empty or non-numeric strings,
/// zero, negatives) is [`LedgerError::InvalidArgument`].
pub fn parse_amount(value: &Value) -> Result<Decimal, LedgerError> {
    let amount = match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
    .ok_or_else(|| LedgerError::InvalidArgument(format!("amount is not a number: {value}")))?;

    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidArgument(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(amount)
}
