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

//! Account reference data.
//!
//! An account belongs to exactly one customer and owns an append-only
//! movement ledger. The current balance is never stored here; it is
//! always derived from the latest movement (see [`crate::Ledger::current_balance`]).

use crate::base::{AccountId, CustomerId};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Savings,
    Checking,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Savings => write!(f, "savings"),
            AccountKind::Checking => write!(f, "checking"),
        }
    }
}

/// A bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Account number, unique across all accounts.
    pub number: String,
    pub kind: AccountKind,
    /// Balance at account opening; immutable once set.
    pub initial_balance: Decimal,
    pub active: bool,
    pub customer_id: CustomerId,
}

/// Input shape for opening an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub number: String,
    pub kind: AccountKind,
    pub initial_balance: Decimal,
    pub active: bool,
    pub customer_id: CustomerId,
}

/// Partial update for an existing account.
///
/// The initial balance and the owning customer are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub number: Option<String>,
    pub kind: Option<AccountKind>,
    pub active: Option<bool>,
}

impl NewAccount {
    /// Validates the input shape before it reaches the store.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_number(&self.number)?;
        if self.initial_balance < Decimal::ZERO {
            return Err(LedgerError::Validation("initial balance must not be negative".into()));
        }
        Ok(())
    }
}

pub(crate) fn validate_number(number: &str) -> Result<(), LedgerError> {
    if number.trim().is_empty() {
        return Err(LedgerError::Validation("account number must not be empty".into()));
    }
    if number.len() > 20 {
        return Err(LedgerError::Validation(
            "account number must not exceed 20 characters".into(),
        ));
    }
    Ok(())
}
