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

//! # Bank Ledger
//!
//! This library provides a banking ledger core: customers own accounts,
//! accounts own an append-only movement ledger, and credits/debits are
//! posted through an atomic transaction that enforces balance and
//! daily-withdrawal-limit invariants.
//!
//! Balance is never stored as a mutable field. It is derived from the
//! latest movement on the account's ledger, falling back to the initial
//! balance for a fresh account.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Central engine managing customers, accounts, and posting
//! - [`LedgerStore`]: Relational-style store with a transactional unit of work
//! - [`Movement`]: Immutable ledger entry with kind, signed value, and resulting balance
//! - [`LedgerError`]: Typed failures for business-rule rejections
//!
//! ## Example
//!
//! ```
//! use bank_ledger_rs::{AccountKind, Ledger, MovementKind, NewAccount, NewCustomer};
//! use rust_decimal_macros::dec;
//!
//! let ledger = Ledger::new();
//!
//! let customer = ledger
//!     .create_customer(NewCustomer {
//!         name: "Jose Lema".into(),
//!         gender: "male".into(),
//!         age: 34,
//!         national_id: "1234567890".into(),
//!         address: Some("Otavalo sn y principal".into()),
//!         phone: Some("098254785".into()),
//!         password: "1234".into(),
//!         active: true,
//!     })
//!     .unwrap();
//!
//! let account = ledger
//!     .create_account(NewAccount {
//!         number: "478758".into(),
//!         kind: AccountKind::Savings,
//!         initial_balance: dec!(2000),
//!         active: true,
//!         customer_id: customer.id,
//!     })
//!     .unwrap();
//!
//! let movement = ledger.post(account.id, MovementKind::Credit, dec!(600)).unwrap();
//! assert_eq!(movement.resulting_balance, dec!(2600));
//! ```
//!
//! ## Thread Safety
//!
//! Posts against one account hold that account's ledger lock for the
//! whole read-validate-append sequence, so two concurrent debits can
//! never both observe the same balance. Posts against different accounts
//! run in parallel.

pub mod account;
mod base;
mod customer;
mod engine;
pub mod error;
mod movement;
mod statement;
pub mod store;

pub use account::{Account, AccountKind, AccountUpdate, NewAccount};
pub use base::{AccountId, CustomerId, MovementId};
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use engine::{DAILY_DEBIT_LIMIT, Ledger};
pub use error::LedgerError;
pub use movement::{Movement, MovementKind};
pub use statement::{AccountStatement, CustomerSummary, Statement};
pub use store::{LedgerStore, LedgerTransaction};
