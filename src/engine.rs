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

//! Movement posting engine and entity directory.
//!
//! The [`Ledger`] is the central component. It manages customer and
//! account reference data and posts credit/debit movements against
//! account ledgers inside a transactional unit of work.
//!
//! # Posting
//!
//! A post runs begin → validate → compute → append → commit against the
//! [`LedgerStore`](crate::store::LedgerStore). Any failure on the way
//! drops the transaction guard, which rolls the whole post back; no
//! partial state ever becomes visible. The balance is re-derived from the
//! latest movement inside every transaction, never cached across
//! requests.
//!
//! # Thread Safety
//!
//! Posts against one account serialize on the account's ledger lock;
//! posts against different accounts run in parallel.

use crate::account::{self, Account, AccountUpdate, NewAccount};
use crate::base::{AccountId, CustomerId, MovementId};
use crate::customer::{Customer, CustomerUpdate, NewCustomer};
use crate::error::LedgerError;
use crate::movement::{Movement, MovementKind};
use crate::store::LedgerStore;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Fixed cap on cumulative absolute debit value per account per calendar
/// day.
pub const DAILY_DEBIT_LIMIT: Decimal = Decimal::ONE_THOUSAND;

/// Banking ledger engine over customers, accounts, and movements.
///
/// # Invariants
///
/// - National IDs and account numbers are unique.
/// - An account's balance is the resulting balance of its latest movement
///   by `(timestamp, id)`, or its initial balance if none exists.
/// - Credits are stored positive, debits negative, regardless of the sign
///   the caller supplied.
/// - A debit never takes the balance below zero and never pushes the
///   day's cumulative debits past [`DAILY_DEBIT_LIMIT`].
pub struct Ledger {
    store: LedgerStore,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            store: LedgerStore::new(),
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    // === Customers ===

    /// Registers a customer.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] - Malformed input shape.
    /// - [`LedgerError::DuplicateIdentifier`] - National ID already taken.
    pub fn create_customer(&self, new: NewCustomer) -> Result<Customer, LedgerError> {
        new.validate()?;
        let customer = Customer {
            id: self.store.next_customer_id(),
            name: new.name,
            gender: new.gender,
            age: new.age,
            national_id: new.national_id,
            address: new.address,
            phone: new.phone,
            password: new.password,
            active: new.active,
        };
        self.store.insert_customer(customer.clone())?;
        debug!(customer = %customer.id, "customer registered");
        Ok(customer)
    }

    pub fn customer(&self, id: CustomerId) -> Result<Customer, LedgerError> {
        self.store.customer(id)
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.store.customers()
    }

    pub fn customer_by_national_id(&self, national_id: &str) -> Option<Customer> {
        self.store.customer_by_national_id(national_id)
    }

    /// Applies a partial update to a customer.
    pub fn update_customer(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, LedgerError> {
        let mut customer = self.store.customer(id)?;
        customer.apply(update)?;
        self.store.update_customer(customer.clone())?;
        Ok(customer)
    }

    /// Deletes a customer. Fails while the customer still owns accounts.
    pub fn delete_customer(&self, id: CustomerId) -> Result<(), LedgerError> {
        self.store.remove_customer(id)
    }

    // === Accounts ===

    /// Opens an account for an existing customer.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] - Malformed input shape.
    /// - [`LedgerError::CustomerNotFound`] - Owner does not exist.
    /// - [`LedgerError::DuplicateIdentifier`] - Account number already taken.
    pub fn create_account(&self, new: NewAccount) -> Result<Account, LedgerError> {
        new.validate()?;
        self.store.customer(new.customer_id)?;
        let account = Account {
            id: self.store.next_account_id(),
            number: new.number,
            kind: new.kind,
            initial_balance: new.initial_balance,
            active: new.active,
            customer_id: new.customer_id,
        };
        self.store.insert_account(account.clone())?;
        debug!(account = %account.id, number = %account.number, "account opened");
        Ok(account)
    }

    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store.account(id)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    pub fn accounts_of(&self, customer_id: CustomerId) -> Vec<Account> {
        self.store.accounts_of(customer_id)
    }

    pub fn account_by_number(&self, number: &str) -> Option<Account> {
        self.store.account_by_number(number)
    }

    /// Applies a partial update to an account. The initial balance and the
    /// owning customer cannot change.
    pub fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        let mut account = self.store.account(id)?;
        if let Some(number) = update.number {
            account::validate_number(&number)?;
            account.number = number;
        }
        if let Some(kind) = update.kind {
            account.kind = kind;
        }
        if let Some(active) = update.active {
            account.active = active;
        }
        self.store.update_account(account.clone())?;
        Ok(account)
    }

    /// Deletes an account. Fails while movements exist on its ledger.
    pub fn delete_account(&self, id: AccountId) -> Result<(), LedgerError> {
        self.store.remove_account(id)
    }

    // === Balance and movements ===

    /// Current balance of an account: the resulting balance of its latest
    /// movement, or the initial balance for a fresh ledger.
    pub fn current_balance(&self, account_id: AccountId) -> Result<Decimal, LedgerError> {
        let account = self.store.account(account_id)?;
        Ok(self
            .store
            .last_movement(account_id)?
            .map(|m| m.resulting_balance)
            .unwrap_or(account.initial_balance))
    }

    /// Movements of an account, newest first by `(timestamp, id)`.
    pub fn movements(&self, account_id: AccountId) -> Result<Vec<Movement>, LedgerError> {
        let mut movements = self.store.movements(account_id)?;
        movements.sort_by_key(|m| std::cmp::Reverse((m.timestamp, m.id)));
        Ok(movements)
    }

    pub fn movement(&self, id: MovementId) -> Option<Movement> {
        self.store.movement(id)
    }

    /// Sum of absolute debit values posted to the account on the given
    /// calendar day.
    pub fn debits_on(&self, account_id: AccountId, day: NaiveDate) -> Result<Decimal, LedgerError> {
        self.store.debits_on(account_id, day)
    }

    /// Deletes a movement by ID and returns whether a row was removed.
    ///
    /// Administrative escape hatch only; it bypasses the append-only
    /// invariant and leaves later resulting balances unadjusted.
    pub fn delete_movement(&self, id: MovementId) -> bool {
        self.store.remove_movement(id)
    }

    // === Posting ===

    /// Posts a movement with the current local time.
    ///
    /// See [`post_at`](Self::post_at).
    pub fn post(
        &self,
        account_id: AccountId,
        kind: MovementKind,
        raw_value: Decimal,
    ) -> Result<Movement, LedgerError> {
        self.post_at(account_id, kind, raw_value, Local::now().naive_local())
    }

    /// Posts a credit or debit movement against an account as a single
    /// atomic transaction.
    ///
    /// The raw value is treated as a magnitude; its sign is ignored. For a
    /// debit, the balance must be positive and cover the amount, and the
    /// day's cumulative debits must stay within [`DAILY_DEBIT_LIMIT`].
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] - Zero value, rejected before the transaction.
    /// - [`LedgerError::AccountNotFound`] - Account does not exist.
    /// - [`LedgerError::AccountInactive`] - Account is disabled.
    /// - [`LedgerError::InsufficientFunds`] - Debit exceeds the balance, or the balance is non-positive.
    /// - [`LedgerError::DailyLimitExceeded`] - Debit would push the day's total past the limit.
    /// - [`LedgerError::Store`] - Commit failure; the post was rolled back.
    ///
    /// Every error path rolls the transaction back; no movement becomes
    /// visible.
    pub fn post_at(
        &self,
        account_id: AccountId,
        kind: MovementKind,
        raw_value: Decimal,
        timestamp: NaiveDateTime,
    ) -> Result<Movement, LedgerError> {
        if raw_value.is_zero() {
            return Err(LedgerError::Validation("movement value must not be zero".into()));
        }

        // Lock the account's ledger for the whole read-validate-append
        // sequence. Dropping `tx` on any early return rolls back.
        let mut tx = self.store.begin(account_id)?;

        let account = self.store.account(account_id)?;
        if !account.active {
            return Err(LedgerError::AccountInactive(account_id));
        }

        let current_balance = tx.balance(account.initial_balance);
        let value = kind.signed(raw_value);

        if kind == MovementKind::Debit {
            if current_balance <= Decimal::ZERO {
                return Err(LedgerError::InsufficientFunds);
            }
            if value.abs() > current_balance {
                return Err(LedgerError::InsufficientFunds);
            }
            // Existing debits for the posting day, not including this one.
            let used = tx.debits_on(timestamp.date());
            if used + value.abs() > DAILY_DEBIT_LIMIT {
                warn!(
                    account = %account_id,
                    %used,
                    attempted = %value.abs(),
                    "daily debit limit exceeded"
                );
                return Err(LedgerError::DailyLimitExceeded {
                    limit: DAILY_DEBIT_LIMIT,
                    used,
                });
            }
        }

        let movement = Movement {
            id: self.store.next_movement_id(),
            timestamp,
            kind,
            value,
            resulting_balance: current_balance + value,
            account_id,
        };
        tx.append(movement.clone());
        tx.commit()?;

        debug!(
            account = %account_id,
            movement = %movement.id,
            kind = %kind,
            value = %movement.value,
            balance = %movement.resulting_balance,
            "movement posted"
        );
        Ok(movement)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
