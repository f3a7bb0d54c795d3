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

//! Customer reference data.
//!
//! Customers own accounts. The national ID is unique across the directory
//! and immutable after creation; everything else can change through a
//! partial [`CustomerUpdate`].

use crate::base::CustomerId;
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub gender: String,
    pub age: u32,
    /// National identification number, unique across all customers.
    pub national_id: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Stored as a plain field; hashing is a boundary concern.
    pub password: String,
    pub active: bool,
}

/// Input shape for customer registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub national_id: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub active: bool,
}

/// Partial update for an existing customer.
///
/// `None` fields are left untouched. The national ID cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub active: Option<bool>,
}

impl NewCustomer {
    /// Validates the input shape before it reaches the store.
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_fields(
            &self.name,
            &self.gender,
            self.age,
            self.address.as_deref(),
            self.phone.as_deref(),
            &self.password,
        )?;
        if self.national_id.trim().is_empty() {
            return Err(LedgerError::Validation("national ID must not be empty".into()));
        }
        if self.national_id.len() > 20 {
            return Err(LedgerError::Validation(
                "national ID must not exceed 20 characters".into(),
            ));
        }
        Ok(())
    }
}

impl Customer {
    /// Applies a partial update and re-validates the merged record.
    pub fn apply(&mut self, update: CustomerUpdate) -> Result<(), LedgerError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        validate_fields(
            &self.name,
            &self.gender,
            self.age,
            self.address.as_deref(),
            self.phone.as_deref(),
            &self.password,
        )
    }
}

fn validate_fields(
    name: &str,
    gender: &str,
    age: u32,
    address: Option<&str>,
    phone: Option<&str>,
    password: &str,
) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("name must not be empty".into()));
    }
    if name.len() > 100 {
        return Err(LedgerError::Validation("name must not exceed 100 characters".into()));
    }
    if gender.trim().is_empty() {
        return Err(LedgerError::Validation("gender must not be empty".into()));
    }
    if gender.len() > 10 {
        return Err(LedgerError::Validation("gender must not exceed 10 characters".into()));
    }
    if !(18..=120).contains(&age) {
        return Err(LedgerError::Validation("age must be between 18 and 120".into()));
    }
    if let Some(address) = address {
        if address.len() > 200 {
            return Err(LedgerError::Validation(
                "address must not exceed 200 characters".into(),
            ));
        }
    }
    if let Some(phone) = phone {
        if phone.len() > 20 {
            return Err(LedgerError::Validation("phone must not exceed 20 characters".into()));
        }
    }
    if !(4..=100).contains(&password.len()) {
        return Err(LedgerError::Validation(
            "password must be between 4 and 100 characters".into(),
        ));
    }
    Ok(())
}
