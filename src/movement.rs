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

//! Ledger entries.
//!
//! A [`Movement`] is immutable once posted. Credits are stored with a
//! positive value, debits with a negative value, and every movement
//! carries the balance that resulted from applying it. Movements on one
//! account are strictly ordered by `(timestamp, id)`.

use crate::base::{AccountId, MovementId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    Credit,
    Debit,
}

impl MovementKind {
    /// Normalizes a raw value into this kind's signed form.
    ///
    /// The raw value is treated as a magnitude regardless of the sign the
    /// caller supplied: a credit always stores `+abs(raw)` and a debit
    /// always stores `-abs(raw)`.
    pub fn signed(self, raw: Decimal) -> Decimal {
        match self {
            MovementKind::Credit => raw.abs(),
            MovementKind::Debit => -raw.abs(),
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Credit => write!(f, "credit"),
            MovementKind::Debit => write!(f, "debit"),
        }
    }
}

/// A posted ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    /// Local posting time; the calendar date of this timestamp drives the
    /// daily-limit window.
    pub timestamp: NaiveDateTime,
    pub kind: MovementKind,
    /// Signed value: positive for credits, negative for debits.
    pub value: Decimal,
    /// Balance of the account after applying this movement.
    pub resulting_balance: Decimal,
    pub account_id: AccountId,
}
