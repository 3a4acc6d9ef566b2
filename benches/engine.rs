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

//! Benchmarks for the ledger engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single payment and deposit
//! - Payment throughput against a growing job table
//! - Contended payments from many threads
//! - Query layer scans

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use job_ledger_rs::{
    Contract, ContractId, ContractStatus, Engine, Job, JobId, MemoryStore, Profile, ProfileId,
    ProfileType,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

const CONTRACTOR: ProfileId = ProfileId(0);

/// `clients` clients with one in-progress contract each, `jobs` unpaid jobs
/// of 1.0000 per contract.
fn make_engine(clients: u32, jobs: u32, balance: i64) -> Engine<MemoryStore> {
    let store = MemoryStore::new();
    store.insert_profile(Profile::new(CONTRACTOR, ProfileType::Contractor, Decimal::ZERO));
    for c in 1..=clients {
        store.insert_profile(Profile::new(
            ProfileId(c),
            ProfileType::Client,
            Decimal::new(balance, 4),
        ));
        store.insert_contract(Contract {
            id: ContractId(c),
            terms: String::new(),
            status: ContractStatus::InProgress,
            client_id: ProfileId(c),
            contractor_id: CONTRACTOR,
        });
        for j in 0..jobs {
            store.insert_job(Job::new(job_id(c, j), ContractId(c), Decimal::new(10000, 4)));
        }
    }
    Engine::new(store)
}

fn job_id(client: u32, job: u32) -> JobId {
    JobId(client * 100_000 + job)
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_payment(c: &mut Criterion) {
    c.bench_function("single_payment", |b| {
        b.iter(|| {
            let engine = make_engine(1, 1, 100_000);
            let client = engine.profile(ProfileId(1)).unwrap();
            engine.pay_for_job(black_box(job_id(1, 0)), &client).unwrap();
        })
    });
}

fn bench_single_deposit(c: &mut Criterion) {
    c.bench_function("single_deposit", |b| {
        b.iter(|| {
            let engine = make_engine(1, 4, 40_000);
            let client = engine.profile(ProfileId(1)).unwrap();
            engine
                .deposit_for_client(ProfileId(1), &client, black_box(Decimal::new(5000, 4)))
                .unwrap();
        })
    });
}

fn bench_payment_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("payment_throughput");

    for count in [10u32, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let engine = make_engine(1, count, i64::from(count) * 10_000);
                let client = engine.profile(ProfileId(1)).unwrap();
                for j in 0..count {
                    engine.pay_for_job(job_id(1, j), &client).unwrap();
                }
                black_box(&engine);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_contended_payments(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_payments");

    for clients in [1u32, 8, 64].iter() {
        let jobs = 64;
        group.throughput(Throughput::Elements(u64::from(*clients * jobs)));
        group.bench_with_input(BenchmarkId::from_parameter(clients), clients, |b, &clients| {
            b.iter(|| {
                let engine = Arc::new(make_engine(clients, jobs, i64::from(jobs) * 10_000));
                (1..=clients).into_par_iter().for_each(|c| {
                    let client = engine.profile(ProfileId(c)).unwrap();
                    (0..jobs).into_par_iter().for_each(|j| {
                        let _ = engine.pay_for_job(job_id(c, j), &client);
                    });
                });
                black_box(&engine);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Query Benchmarks
// =============================================================================

fn bench_unpaid_jobs(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpaid_jobs");

    for clients in [10u32, 100, 1_000].iter() {
        let engine = make_engine(*clients, 10, 0);
        let client = engine.profile(ProfileId(1)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(clients), clients, |b, _| {
            b.iter(|| black_box(engine.unpaid_jobs(&client).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_payment,
    bench_single_deposit,
    bench_payment_throughput,
    bench_contended_payments,
    bench_unpaid_jobs,
);
criterion_main!(benches);
