// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The bank-ledger-rs Authors
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

//! Concurrent posting tests.
//!
//! These verify the serialization guarantee: posts against one account
//! hold the account's ledger lock for the whole read-validate-append
//! sequence, so concurrent debits can never both observe the same balance
//! (lost-update prevention), while posts against different accounts run
//! in parallel. A background watcher uses parking_lot's deadlock detector
//! to catch lock cycles.

use bank_ledger_rs::{
    AccountId, AccountKind, Ledger, LedgerError, MovementKind, NewAccount, NewCustomer,
};
use parking_lot::deadlock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn spawn_deadlock_watcher() {
    thread::spawn(|| {
        for _ in 0..50 {
            thread::sleep(Duration::from_millis(100));
            let deadlocks = deadlock::check_deadlock();
            assert!(deadlocks.is_empty(), "deadlock detected: {} cycles", deadlocks.len());
        }
    });
}

fn seeded_ledger(accounts: u32, initial_balance: Decimal) -> (Arc<Ledger>, Vec<AccountId>) {
    let ledger = Ledger::new();
    let customer = ledger
        .create_customer(NewCustomer {
            name: "Jose Lema".into(),
            gender: "male".into(),
            age: 34,
            national_id: "1234567890".into(),
            address: None,
            phone: None,
            password: "1234".into(),
            active: true,
        })
        .unwrap();
    let account_ids = (0..accounts)
        .map(|i| {
            ledger
                .create_account(NewAccount {
                    number: format!("478{i:03}"),
                    kind: AccountKind::Savings,
                    initial_balance,
                    active: true,
                    customer_id: customer.id,
                })
                .unwrap()
                .id
        })
        .collect();
    (Arc::new(ledger), account_ids)
}

#[test]
fn concurrent_debits_cannot_both_drain_the_balance() {
    spawn_deadlock_watcher();

    // $1000 balance, two $600 debits racing: exactly one must win.
    let (ledger, accounts) = seeded_ledger(1, dec!(1000));
    let account_id = accounts[0];
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.post(account_id, MovementKind::Debit, dec!(600))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let failures: Vec<_> = results.into_iter().filter_map(|r| r.err()).collect();

    assert_eq!(successes, 1);
    assert_eq!(failures, vec![LedgerError::InsufficientFunds]);
    assert_eq!(ledger.current_balance(account_id).unwrap(), dec!(400));
    assert_eq!(ledger.movements(account_id).unwrap().len(), 1);
}

#[test]
fn concurrent_credits_never_lose_updates() {
    spawn_deadlock_watcher();

    const THREADS: u32 = 8;
    const CREDITS_PER_THREAD: u32 = 50;

    let (ledger, accounts) = seeded_ledger(1, dec!(0));
    let account_id = accounts[0];
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..CREDITS_PER_THREAD {
                    ledger.post(account_id, MovementKind::Credit, dec!(1)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = Decimal::from(THREADS * CREDITS_PER_THREAD);
    assert_eq!(ledger.current_balance(account_id).unwrap(), expected);

    // The balance chain stays consistent under interleaving: every
    // movement's resulting balance equals its predecessor's plus its
    // value, in (timestamp, id) order.
    let mut movements = ledger.movements(account_id).unwrap();
    movements.reverse();
    let mut running = Decimal::ZERO;
    for movement in &movements {
        running += movement.value;
        assert_eq!(movement.resulting_balance, running);
    }
}

#[test]
fn cross_account_posts_proceed_in_parallel() {
    spawn_deadlock_watcher();

    const ACCOUNTS: u32 = 16;
    let (ledger, accounts) = seeded_ledger(ACCOUNTS, dec!(5000));
    let barrier = Arc::new(Barrier::new(ACCOUNTS as usize));

    let handles: Vec<_> = accounts
        .iter()
        .map(|&account_id| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    ledger.post(account_id, MovementKind::Credit, dec!(2.5)).unwrap();
                }
                ledger.post(account_id, MovementKind::Debit, dec!(50)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for &account_id in &accounts {
        assert_eq!(ledger.current_balance(account_id).unwrap(), dec!(5000));
        assert_eq!(ledger.movements(account_id).unwrap().len(), 21);
    }
}

#[test]
fn concurrent_daily_limit_admits_at_most_the_cap() {
    spawn_deadlock_watcher();

    const THREADS: u32 = 10;

    // Plenty of balance; only the $1000 daily cap constrains. Ten racing
    // $300 debits: at most three can land.
    let (ledger, accounts) = seeded_ledger(1, dec!(100000));
    let account_id = accounts[0];
    let barrier = Arc::new(Barrier::new(THREADS as usize));
    let successes = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            let successes = Arc::clone(&successes);
            thread::spawn(move || {
                barrier.wait();
                match ledger.post(account_id, MovementKind::Debit, dec!(300)) {
                    Ok(_) => {
                        successes.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(LedgerError::DailyLimitExceeded { limit, .. }) => {
                        assert_eq!(limit, dec!(1000));
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), 3);
    assert_eq!(ledger.current_balance(account_id).unwrap(), dec!(99100));
}

#[test]
fn concurrent_registrations_cannot_share_a_national_id() {
    spawn_deadlock_watcher();

    const THREADS: usize = 8;
    let ledger = Arc::new(Ledger::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.create_customer(NewCustomer {
                    name: format!("Customer {i}"),
                    gender: "other".into(),
                    age: 30,
                    national_id: "1716283009".into(),
                    address: None,
                    phone: None,
                    password: "1234".into(),
                    active: true,
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(winners, 1);
    assert_eq!(ledger.customers().len(), 1);
    for result in results {
        if let Err(e) = result {
            assert_eq!(e, LedgerError::DuplicateIdentifier("1716283009".into()));
        }
    }
}
