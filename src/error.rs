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

//! Error types for ledger operations.

use crate::base::{AccountId, CustomerId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger operation errors.
///
/// Every business-rule rejection is detected inside the posting
/// transaction and rolls it back before propagating. The boundary layer
/// maps these variants to transport-level responses; the variants carry
/// enough structure (kind plus parameters) that it never has to re-derive
/// them from message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced customer does not exist
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// Referenced account does not exist
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// Account exists but its active flag is false
    #[error("account {0} is inactive")]
    AccountInactive(AccountId),

    /// Debit exceeds the available balance, or the balance is already non-positive
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Cumulative debits for the calendar day would exceed the fixed limit
    #[error("daily debit limit exceeded: limit ${limit}, used today ${used}")]
    DailyLimitExceeded { limit: Decimal, used: Decimal },

    /// Uniqueness violation on a national ID or an account number
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Malformed input, rejected before reaching the transaction
    #[error("invalid input: {0}")]
    Validation(String),

    /// Underlying store failure; the transaction was rolled back
    #[error("ledger store failure: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::LedgerError;
    use crate::base::{AccountId, CustomerId};
    use rust_decimal_macros::dec;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::CustomerNotFound(CustomerId(7)).to_string(),
            "customer 7 not found"
        );
        assert_eq!(
            LedgerError::AccountNotFound(AccountId(3)).to_string(),
            "account 3 not found"
        );
        assert_eq!(
            LedgerError::AccountInactive(AccountId(3)).to_string(),
            "account 3 is inactive"
        );
        assert_eq!(LedgerError::InsufficientFunds.to_string(), "insufficient funds");
        assert_eq!(
            LedgerError::DuplicateIdentifier("478758".into()).to_string(),
            "duplicate identifier: 478758"
        );
        assert_eq!(
            LedgerError::Validation("name must not be empty".into()).to_string(),
            "invalid input: name must not be empty"
        );
        assert_eq!(
            LedgerError::Store("disk full".into()).to_string(),
            "ledger store failure: disk full"
        );
    }

    #[test]
    fn daily_limit_message_carries_limit_and_used() {
        let err = LedgerError::DailyLimitExceeded {
            limit: dec!(1000),
            used: dec!(550),
        };
        assert_eq!(
            err.to_string(),
            "daily debit limit exceeded: limit $1000, used today $550"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::InsufficientFunds;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
