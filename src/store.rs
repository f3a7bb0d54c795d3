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

//! Durable-store stand-in with a transactional unit of work.
//!
//! The store keeps three relations (customers, accounts, movements) with
//! referential integrity customer ← account ← movement, plus uniqueness
//! indexes on national ID and account number. Uniqueness is claimed
//! atomically through the [`DashMap`] entry API.
//!
//! # Transactions
//!
//! [`LedgerStore::begin`] locks the target account's ledger and returns a
//! [`LedgerTransaction`]. Appends made through the guard are staged and
//! only become visible to other transactions at [`LedgerTransaction::commit`];
//! dropping the guard on any other exit path discards the staged writes.
//! Holding the ledger mutex for the whole read-validate-append sequence
//! serializes concurrent posts against one account while posts against
//! different accounts proceed in parallel.

use crate::account::Account;
use crate::base::{AccountId, CustomerId, MovementId};
use crate::customer::Customer;
use crate::error::LedgerError;
use crate::movement::{Movement, MovementKind};
use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use rust_decimal::Decimal;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

type SharedLedger = Arc<Mutex<Vec<Movement>>>;

/// In-memory ledger store.
pub struct LedgerStore {
    /// Customers indexed by ID.
    customers: DashMap<CustomerId, Customer>,
    /// Accounts indexed by ID.
    accounts: DashMap<AccountId, Account>,
    /// Append-only movement ledgers, one per account.
    ledgers: DashMap<AccountId, SharedLedger>,
    /// Uniqueness index: national ID -> customer.
    national_ids: DashMap<String, CustomerId>,
    /// Uniqueness index: account number -> account.
    account_numbers: DashMap<String, AccountId>,
    next_customer_id: AtomicU32,
    next_account_id: AtomicU32,
    next_movement_id: AtomicU64,
    #[cfg(test)]
    commit_fault: AtomicBool,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            accounts: DashMap::new(),
            ledgers: DashMap::new(),
            national_ids: DashMap::new(),
            account_numbers: DashMap::new(),
            next_customer_id: AtomicU32::new(0),
            next_account_id: AtomicU32::new(0),
            next_movement_id: AtomicU64::new(0),
            #[cfg(test)]
            commit_fault: AtomicBool::new(false),
        }
    }

    pub fn next_customer_id(&self) -> CustomerId {
        CustomerId(self.next_customer_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn next_account_id(&self) -> AccountId {
        AccountId(self.next_account_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn next_movement_id(&self) -> MovementId {
        MovementId(self.next_movement_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    // === Customers ===

    /// Inserts a new customer, claiming its national ID.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateIdentifier`] if another customer already
    /// holds the same national ID. The claim uses the entry API so two
    /// concurrent registrations cannot both win.
    pub fn insert_customer(&self, customer: Customer) -> Result<(), LedgerError> {
        match self.national_ids.entry(customer.national_id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateIdentifier(customer.national_id)),
            Entry::Vacant(entry) => {
                entry.insert(customer.id);
                self.customers.insert(customer.id, customer);
                Ok(())
            }
        }
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer, LedgerError> {
        self.customers
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or(LedgerError::CustomerNotFound(id))
    }

    pub fn customers(&self) -> Vec<Customer> {
        let mut customers: Vec<Customer> = self.customers.iter().map(|c| c.value().clone()).collect();
        customers.sort_by_key(|c| c.id);
        customers
    }

    pub fn customer_by_national_id(&self, national_id: &str) -> Option<Customer> {
        let id = *self.national_ids.get(national_id)?;
        self.customers.get(&id).map(|c| c.value().clone())
    }

    /// Replaces an existing customer row. The national ID is immutable, so
    /// no index maintenance is needed.
    pub fn update_customer(&self, customer: Customer) -> Result<(), LedgerError> {
        match self.customers.entry(customer.id) {
            Entry::Occupied(mut entry) => {
                entry.insert(customer);
                Ok(())
            }
            Entry::Vacant(_) => Err(LedgerError::CustomerNotFound(customer.id)),
        }
    }

    /// Removes a customer. Restricted: fails while the customer still owns
    /// accounts, mirroring the relational delete-restrict constraint.
    pub fn remove_customer(&self, id: CustomerId) -> Result<(), LedgerError> {
        let customer = self.customer(id)?;
        if !self.accounts_of(id).is_empty() {
            return Err(LedgerError::Validation(format!(
                "customer {id} still owns accounts"
            )));
        }
        self.customers.remove(&id);
        self.national_ids.remove(&customer.national_id);
        Ok(())
    }

    // === Accounts ===

    /// Inserts a new account, claiming its number and creating an empty
    /// ledger for it.
    pub fn insert_account(&self, account: Account) -> Result<(), LedgerError> {
        match self.account_numbers.entry(account.number.clone()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateIdentifier(account.number)),
            Entry::Vacant(entry) => {
                entry.insert(account.id);
                self.ledgers
                    .insert(account.id, Arc::new(Mutex::new(Vec::new())));
                self.accounts.insert(account.id, account);
                Ok(())
            }
        }
    }

    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&id)
            .map(|a| a.value().clone())
            .ok_or(LedgerError::AccountNotFound(id))
    }

    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.iter().map(|a| a.value().clone()).collect();
        accounts.sort_by_key(|a| a.id);
        accounts
    }

    pub fn accounts_of(&self, customer_id: CustomerId) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.customer_id == customer_id)
            .map(|a| a.value().clone())
            .collect();
        accounts.sort_by_key(|a| a.id);
        accounts
    }

    pub fn account_by_number(&self, number: &str) -> Option<Account> {
        let id = *self.account_numbers.get(number)?;
        self.accounts.get(&id).map(|a| a.value().clone())
    }

    /// Replaces an existing account row, re-claiming the number index when
    /// the number changed.
    pub fn update_account(&self, account: Account) -> Result<(), LedgerError> {
        let previous = self.account(account.id)?;
        if previous.number != account.number {
            match self.account_numbers.entry(account.number.clone()) {
                Entry::Occupied(_) => {
                    return Err(LedgerError::DuplicateIdentifier(account.number));
                }
                Entry::Vacant(entry) => {
                    entry.insert(account.id);
                }
            }
            self.account_numbers.remove(&previous.number);
        }
        self.accounts.insert(account.id, account);
        Ok(())
    }

    /// Removes an account. Restricted: fails while movements exist on its
    /// ledger.
    pub fn remove_account(&self, id: AccountId) -> Result<(), LedgerError> {
        let account = self.account(id)?;
        let ledger = self.ledger(id)?;
        let guard = ledger.lock();
        if !guard.is_empty() {
            return Err(LedgerError::Validation(format!(
                "account {id} still has movements"
            )));
        }
        self.accounts.remove(&id);
        self.account_numbers.remove(&account.number);
        drop(guard);
        self.ledgers.remove(&id);
        Ok(())
    }

    // === Movements ===

    fn ledger(&self, account_id: AccountId) -> Result<SharedLedger, LedgerError> {
        self.ledgers
            .get(&account_id)
            .map(|l| Arc::clone(l.value()))
            .ok_or(LedgerError::AccountNotFound(account_id))
    }

    /// Begins a posting transaction against one account.
    ///
    /// Blocks until any in-flight transaction on the same account commits
    /// or rolls back.
    pub fn begin(&self, account_id: AccountId) -> Result<LedgerTransaction, LedgerError> {
        let ledger = self.ledger(account_id)?;
        Ok(LedgerTransaction {
            guard: ledger.lock_arc(),
            staged: Vec::new(),
            #[cfg(test)]
            fail_commit: self.commit_fault.swap(false, Ordering::SeqCst),
        })
    }

    /// Latest movement by `(timestamp, id)`, or `None` for a fresh ledger.
    pub fn last_movement(&self, account_id: AccountId) -> Result<Option<Movement>, LedgerError> {
        let ledger = self.ledger(account_id)?;
        let guard = ledger.lock();
        Ok(guard.iter().max_by_key(|m| (m.timestamp, m.id)).cloned())
    }

    /// All movements of an account in append order.
    pub fn movements(&self, account_id: AccountId) -> Result<Vec<Movement>, LedgerError> {
        let ledger = self.ledger(account_id)?;
        let guard = ledger.lock();
        Ok(guard.clone())
    }

    /// Sum of `abs(value)` over debit movements dated on the given
    /// calendar day.
    pub fn debits_on(&self, account_id: AccountId, day: NaiveDate) -> Result<Decimal, LedgerError> {
        let ledger = self.ledger(account_id)?;
        let guard = ledger.lock();
        Ok(sum_debits_on(guard.iter(), day))
    }

    /// Looks up a movement by ID across all ledgers.
    pub fn movement(&self, id: MovementId) -> Option<Movement> {
        for ledger in self.ledgers.iter() {
            let guard = ledger.lock();
            if let Some(movement) = guard.iter().find(|m| m.id == id) {
                return Some(movement.clone());
            }
        }
        None
    }

    /// Deletes a movement by ID. Administrative escape hatch; the ledger
    /// is append-only in normal operation. Returns whether a row was
    /// removed.
    pub fn remove_movement(&self, id: MovementId) -> bool {
        for ledger in self.ledgers.iter() {
            let mut guard = ledger.lock();
            if let Some(position) = guard.iter().position(|m| m.id == id) {
                guard.remove(position);
                return true;
            }
        }
        false
    }

    /// Arms a one-shot commit failure for the next transaction.
    #[cfg(test)]
    pub(crate) fn fail_next_commit(&self) {
        self.commit_fault.store(true, Ordering::SeqCst);
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sum_debits_on<'a>(movements: impl Iterator<Item = &'a Movement>, day: NaiveDate) -> Decimal {
    movements
        .filter(|m| m.kind == MovementKind::Debit && m.timestamp.date() == day)
        .map(|m| m.value.abs())
        .sum()
}

/// A scoped unit of work over one account's ledger.
///
/// Reads see committed movements plus this transaction's staged appends.
/// [`commit`](Self::commit) publishes the staged appends; dropping the
/// guard on any other path (early `?` return, panic, caller abort) rolls
/// the transaction back with no partial state.
pub struct LedgerTransaction {
    guard: ArcMutexGuard<RawMutex, Vec<Movement>>,
    staged: Vec<Movement>,
    #[cfg(test)]
    fail_commit: bool,
}

impl LedgerTransaction {
    fn all(&self) -> impl Iterator<Item = &Movement> {
        self.guard.iter().chain(self.staged.iter())
    }

    /// Latest movement visible to this transaction, by `(timestamp, id)`.
    pub fn last_movement(&self) -> Option<&Movement> {
        self.all().max_by_key(|m| (m.timestamp, m.id))
    }

    /// Current balance: the resulting balance of the latest movement, or
    /// the given initial balance for a fresh ledger.
    pub fn balance(&self, initial_balance: Decimal) -> Decimal {
        self.last_movement()
            .map(|m| m.resulting_balance)
            .unwrap_or(initial_balance)
    }

    /// Sum of `abs(value)` over debit movements dated on the given
    /// calendar day, as seen by this transaction.
    pub fn debits_on(&self, day: NaiveDate) -> Decimal {
        sum_debits_on(self.all(), day)
    }

    /// Stages an append. Not visible outside this transaction until
    /// commit.
    pub fn append(&mut self, movement: Movement) {
        self.staged.push(movement);
    }

    /// Publishes the staged appends and releases the account lock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Store`] if the underlying store fails; the staged
    /// writes are discarded before the error propagates.
    pub fn commit(mut self) -> Result<(), LedgerError> {
        #[cfg(test)]
        if self.fail_commit {
            return Err(LedgerError::Store("injected commit fault".into()));
        }
        let staged = std::mem::take(&mut self.staged);
        self.guard.extend(staged);
        Ok(())
    }

    /// Discards the staged appends. Equivalent to dropping the guard,
    /// spelled out for call sites that roll back deliberately.
    pub fn rollback(self) {}
}
