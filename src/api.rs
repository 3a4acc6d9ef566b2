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

//! REST API over the ledger engine.
//!
//! Every route requires a `profile_id` header naming an existing profile;
//! otherwise it answers 401.
//!
//! ## Endpoints
//!
//! - `GET /contracts/{id}` - A contract the caller is party to
//! - `GET /contracts` - The caller's non-terminated contracts
//! - `GET /jobs/unpaid` - Unpaid jobs on the caller's in-progress contracts
//! - `POST /jobs/{job_id}/pay` - Pay for a job
//! - `POST /balances/deposit/{user_id}` - Deposit `{"amount": n}`
//! - `GET /admin/best-profession?start=&end=` - Highest earning profession
//! - `GET /admin/best-clients?start=&end=&limit=` - Highest paying clients
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:3001/jobs/2/pay -H "profile_id: 1"
//!
//! curl -X POST http://localhost:3001/balances/deposit/2 \
//!   -H "profile_id: 2" -H "Content-Type: application/json" \
//!   -d '{"amount": 50}'
//! ```

use crate::LedgerError;
use crate::base::{ContractId, JobId, ProfileId};
use crate::contract::Contract;
use crate::engine::Engine;
use crate::error::DepositRejection;
use crate::job::Job;
use crate::memory::MemoryStore;
use crate::profile::Profile;
use crate::report::{
    Bound, ClientSpend, DEFAULT_BEST_CLIENTS_LIMIT, ProfessionEarnings, parse_bound,
};
use crate::store::DateRange;
use axum::{
    Json, Router,
    extract::{
        FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// Header carrying the caller's profile id.
pub const PROFILE_HEADER: &str = "profile_id";

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    #[serde(default)]
    pub amount: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(alias = "startDate")]
    pub start: Option<String>,
    #[serde(alias = "endDate")]
    pub end: Option<String>,
    pub limit: Option<String>,
}

impl ReportQuery {
    fn range(&self) -> Result<DateRange, LedgerError> {
        let start = self
            .start
            .as_deref()
            .map(|s| parse_bound(s, Bound::Start))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .map(|s| parse_bound(s, Bound::End))
            .transpose()?;
        Ok(DateRange::new(start, end))
    }

    fn limit(&self) -> Result<usize, LedgerError> {
        match self.limit.as_deref() {
            None => Ok(DEFAULT_BEST_CLIENTS_LIMIT),
            Some(text) => text
                .trim()
                .parse()
                .map_err(|_| LedgerError::InvalidArgument(format!("bad limit: {text:?}"))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

// === Application State ===

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine<MemoryStore>>,
}

// === Error Handling ===

/// Wrapper for converting `LedgerError` into HTTP responses.
#[derive(Debug)]
pub struct AppError(pub LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::PaymentRejected => (StatusCode::FORBIDDEN, "PAYMENT_REJECTED"),
            LedgerError::DepositRejected(DepositRejection::NoObligations) => {
                (StatusCode::FORBIDDEN, "NO_OBLIGATIONS")
            }
            LedgerError::DepositRejected(DepositRejection::LimitReached) => {
                (StatusCode::FORBIDDEN, "DEPOSIT_LIMIT_REACHED")
            }
            LedgerError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            LedgerError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let message = match &self.0 {
            LedgerError::Storage(detail) => {
                error!(%detail, "storage failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Authentication ===

/// The profile named by the `profile_id` header.
pub struct Caller(pub Profile);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let id = parts
            .headers
            .get(PROFILE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<ProfileId>().ok())
            .ok_or(LedgerError::Unauthorized)?;
        Ok(Caller(state.engine.authenticate(id)?))
    }
}

/// Ids that do not parse as a record id match no record.
fn path_id(path: Result<Path<u32>, PathRejection>) -> Result<u32, LedgerError> {
    path.map(|Path(id)| id).map_err(|_| LedgerError::NotFound)
}

// === Handlers ===

/// GET /contracts/{id}
async fn get_contract(
    State(state): State<AppState>,
    Caller(profile): Caller,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<Contract>, AppError> {
    let id = ContractId(path_id(id)?);
    Ok(Json(state.engine.contract(id, &profile)?))
}

/// GET /contracts
async fn list_contracts(
    State(state): State<AppState>,
    Caller(profile): Caller,
) -> Result<Json<Vec<Contract>>, AppError> {
    Ok(Json(state.engine.contracts_for(&profile)?))
}

/// GET /jobs/unpaid
async fn unpaid_jobs(
    State(state): State<AppState>,
    Caller(profile): Caller,
) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.engine.unpaid_jobs(&profile)?))
}

/// POST /jobs/{job_id}/pay
async fn pay_job(
    State(state): State<AppState>,
    Caller(profile): Caller,
    job_id: Result<Path<u32>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let job_id = JobId(path_id(job_id)?);
    state.engine.pay_for_job(job_id, &profile)?;
    Ok(MessageResponse::new("Payment successful"))
}

/// POST /balances/deposit/{user_id}
///
/// The credited amount may be clamped below the requested one; the response
/// does not say by how much.
async fn deposit(
    State(state): State<AppState>,
    Caller(profile): Caller,
    user_id: Result<Path<u32>, PathRejection>,
    body: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let target = ProfileId(path_id(user_id)?);
    let Json(request) =
        body.map_err(|rejection| LedgerError::InvalidArgument(rejection.body_text()))?;
    state.engine.deposit_value(target, &profile, &request.amount)?;
    Ok(MessageResponse::new("Deposit successful"))
}

/// GET /admin/best-profession
async fn best_profession(
    State(state): State<AppState>,
    Caller(_): Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ProfessionEarnings>, AppError> {
    Ok(Json(state.engine.best_profession(query.range()?)?))
}

/// GET /admin/best-clients
async fn best_clients(
    State(state): State<AppState>,
    Caller(_): Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<ClientSpend>>, AppError> {
    let range = query.range()?;
    let limit = query.limit()?;
    Ok(Json(state.engine.best_clients(range, limit)?))
}

// === Router ===

pub fn router(engine: Arc<Engine<MemoryStore>>) -> Router {
    Router::new()
        .route("/contracts", get(list_contracts))
        .route("/contracts/{id}", get(get_contract))
        .route("/jobs/unpaid", get(unpaid_jobs))
        .route("/jobs/{job_id}/pay", post(pay_job))
        .route("/balances/deposit/{user_id}", post(deposit))
        .route("/admin/best-profession", get(best_profession))
        .route("/admin/best-clients", get(best_clients))
        .with_state(AppState { engine })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_query_defaults() {
        let query = ReportQuery::default();
        assert_eq!(query.range().unwrap(), DateRange::default());
        assert_eq!(query.limit().unwrap(), DEFAULT_BEST_CLIENTS_LIMIT);
    }

    #[test]
    fn report_query_rejects_bad_limit() {
        let query = ReportQuery {
            limit: Some("many".into()),
            ..Default::default()
        };
        assert!(matches!(query.limit(), Err(LedgerError::InvalidArgument(_))));
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (LedgerError::NotFound, StatusCode::NOT_FOUND),
            (LedgerError::PaymentRejected, StatusCode::FORBIDDEN),
            (
                LedgerError::DepositRejected(DepositRejection::LimitReached),
                StatusCode::FORBIDDEN,
            ),
            (
                LedgerError::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (LedgerError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                LedgerError::Storage("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError(err).into_response().status(), status);
        }
    }
}
