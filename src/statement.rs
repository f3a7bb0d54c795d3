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

//! Account statement reporting.
//!
//! A statement covers one customer and an inclusive calendar-date range.
//! Movement inclusion compares dates, not times: a movement posted at
//! 23:59 on the `to` date is in range. Credit and debit totals sum
//! absolute values, per account and as a grand total. This window is
//! unrelated to the daily debit limit, which is always scoped to the
//! posting day.

use crate::account::AccountKind;
use crate::base::CustomerId;
use crate::engine::Ledger;
use crate::error::LedgerError;
use crate::movement::{Movement, MovementKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer header of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub national_id: String,
}

/// Per-account section of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    pub number: String,
    pub kind: AccountKind,
    pub initial_balance: Decimal,
    /// Balance as of now, not as of the end of the range.
    pub current_balance: Decimal,
    /// In-range movements, ascending by `(timestamp, id)`.
    pub movements: Vec<Movement>,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
}

/// Statement for one customer over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub customer: CustomerSummary,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub accounts: Vec<AccountStatement>,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
}

impl Ledger {
    /// Assembles the account statement of a customer over `[from, to]`,
    /// inclusive on both ends by calendar date.
    ///
    /// # Errors
    ///
    /// [`LedgerError::CustomerNotFound`] if the customer does not exist.
    pub fn statement(
        &self,
        customer_id: CustomerId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Statement, LedgerError> {
        let customer = self.customer(customer_id)?;

        let mut accounts = Vec::new();
        let mut total_credits = Decimal::ZERO;
        let mut total_debits = Decimal::ZERO;

        for account in self.accounts_of(customer_id) {
            let mut movements: Vec<Movement> = self
                .store()
                .movements(account.id)?
                .into_iter()
                .filter(|m| {
                    let date = m.timestamp.date();
                    date >= from && date <= to
                })
                .collect();
            movements.sort_by_key(|m| (m.timestamp, m.id));

            let credits: Decimal = movements
                .iter()
                .filter(|m| m.kind == MovementKind::Credit)
                .map(|m| m.value.abs())
                .sum();
            let debits: Decimal = movements
                .iter()
                .filter(|m| m.kind == MovementKind::Debit)
                .map(|m| m.value.abs())
                .sum();
            total_credits += credits;
            total_debits += debits;

            accounts.push(AccountStatement {
                number: account.number.clone(),
                kind: account.kind,
                initial_balance: account.initial_balance,
                current_balance: self.current_balance(account.id)?,
                movements,
                total_credits: credits,
                total_debits: debits,
            });
        }

        Ok(Statement {
            customer: CustomerSummary {
                id: customer.id,
                name: customer.name,
                national_id: customer.national_id,
            },
            from,
            to,
            accounts,
            total_credits,
            total_debits,
        })
    }
}
