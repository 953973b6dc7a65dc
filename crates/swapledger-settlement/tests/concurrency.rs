//! Concurrency tests: racing callers on one ledger.
//!
//! Concurrent locks of one id must produce exactly one record; concurrent
//! resolutions of one swap must move its value exactly once.

use std::sync::{Arc, Barrier};
use std::thread;

use rust_decimal::Decimal;
use swapledger_settlement::{InMemoryBalances, RecordingSink, SettlementLedger};
use swapledger_types::*;

const THREADS: usize = 16;

fn coordinator() -> PartyId {
    PartyId::new("coordinator")
}

fn proposer() -> PartyId {
    PartyId::new("proposer")
}

fn ledger_with_proposer_funds(
    amount: Decimal,
) -> (Arc<SettlementLedger<InMemoryBalances>>, Arc<RecordingSink>) {
    let balances = InMemoryBalances::new();
    balances.deposit(&proposer(), amount);
    let sink = Arc::new(RecordingSink::new());
    let ledger = SettlementLedger::new(LedgerConfig::new(coordinator()), balances)
        .unwrap()
        .with_event_sink(Arc::clone(&sink));
    (Arc::new(ledger), sink)
}

#[test]
fn racing_locks_on_one_id_create_one_record() {
    let (ledger, sink) = ledger_with_proposer_funds(Decimal::new(10_000_000_000, 0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.lock(&proposer(), LockRequest::sample("1"))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(SwapError::DuplicateSwap(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, THREADS - 1);
    assert_eq!(ledger.len(), 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(
        ledger.transfer().balance(&proposer()),
        Decimal::new(10_000_000_000 - 100_001_000, 0)
    );
    ledger.verify_custody().unwrap();
}

#[test]
fn racing_resolutions_move_value_once() {
    let (ledger, sink) = ledger_with_proposer_funds(Decimal::new(1_000_000_000, 0));
    let record = ledger.lock(&proposer(), LockRequest::sample("1")).unwrap();
    let request = ResolveRequest::for_record(&record);
    let barrier = Barrier::new(THREADS);

    let outcomes: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let (ledger, request, barrier) = (&ledger, &request, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    if i % 2 == 0 {
                        ledger.unlock(&coordinator(), request)
                    } else {
                        ledger.abort(&coordinator(), request)
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = outcomes.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(
        outcomes
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::InvalidState)
    );

    let acceptor = PartyId::new("acceptor");
    let paid_out = ledger.transfer().balance(&acceptor) + ledger.transfer().balance(&proposer());
    assert_eq!(paid_out, Decimal::new(1_000_000_000, 0));
    assert_eq!(ledger.escrow_balance(), Decimal::ZERO);
    assert_eq!(sink.len(), 2);
    assert_eq!(ledger.status(&record.swap_id), Some(winners[0].record.status));
    ledger.verify_custody().unwrap();
}

#[test]
fn distinct_swaps_proceed_in_parallel() {
    let per_swap = Decimal::new(100_001_000, 0);
    let (ledger, sink) = ledger_with_proposer_funds(per_swap * Decimal::from(THREADS));

    thread::scope(|s| {
        for i in 0..THREADS {
            let ledger = &ledger;
            s.spawn(move || {
                let record = ledger
                    .lock(&proposer(), LockRequest::sample(&format!("swap-{i}")))
                    .unwrap();
                ledger
                    .unlock(&coordinator(), &ResolveRequest::for_record(&record))
                    .unwrap();
            });
        }
    });

    assert_eq!(ledger.len(), THREADS);
    assert_eq!(ledger.locked_count(), 0);
    assert_eq!(sink.len(), THREADS * 2);
    assert_eq!(
        ledger.transfer().balance(&PartyId::new("acceptor")),
        Decimal::new(100_000_000, 0) * Decimal::from(THREADS)
    );
    assert_eq!(
        ledger.transfer().balance(&proposer()),
        Decimal::new(1_000, 0) * Decimal::from(THREADS)
    );
    ledger.verify_custody().unwrap();
}
