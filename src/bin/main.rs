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

use bank_ledger_rs::{AccountKind, Ledger, MovementKind, NewAccount, NewCustomer};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::warn;

/// Bank Ledger - Process ledger operation CSV files
///
/// Reads customer registrations, account openings, and credit/debit
/// postings from a CSV file and outputs the resulting account states to
/// stdout.
#[derive(Parser, Debug)]
#[command(name = "bank-ledger-rs")]
#[command(about = "A banking ledger that processes operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with ledger operations
    ///
    /// Expected format: op,name,gender,age,national_id,account,kind,value
    /// Example: cargo run -- operations.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let ledger = match process_operations(BufReader::new(file)) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_accounts(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, name, gender, age, national_id, account, kind, value`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    name: Option<String>,
    gender: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    age: Option<u32>,
    national_id: Option<String>,
    account: Option<String>,
    kind: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    value: Option<Decimal>,
}

/// A ledger operation parsed from one CSV row.
#[derive(Debug)]
enum Operation {
    Customer(NewCustomer),
    Account {
        national_id: String,
        account: NewAccountRow,
    },
    Post {
        number: String,
        kind: MovementKind,
        value: Decimal,
    },
}

#[derive(Debug)]
struct NewAccountRow {
    number: String,
    kind: AccountKind,
    initial_balance: Decimal,
}

impl CsvRecord {
    /// Converts a CSV record into an Operation.
    ///
    /// Returns `None` for unknown operations or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        match self.op.to_lowercase().as_str() {
            "customer" => Some(Operation::Customer(NewCustomer {
                name: self.name?,
                gender: self.gender?,
                age: self.age?,
                national_id: self.national_id?,
                address: None,
                phone: None,
                // Seeding tool; real credential handling is a boundary concern.
                password: "changeme".into(),
                active: true,
            })),
            "account" => {
                let kind = match self.kind?.to_lowercase().as_str() {
                    "savings" => AccountKind::Savings,
                    "checking" => AccountKind::Checking,
                    _ => return None,
                };
                Some(Operation::Account {
                    national_id: self.national_id?,
                    account: NewAccountRow {
                        number: self.account?,
                        kind,
                        initial_balance: self.value?,
                    },
                })
            }
            "credit" => Some(Operation::Post {
                number: self.account?,
                kind: MovementKind::Credit,
                value: self.value?,
            }),
            "debit" => Some(Operation::Post {
                number: self.account?,
                kind: MovementKind::Debit,
                value: self.value?,
            }),
            _ => None,
        }
    }
}

/// Applies one operation to the ledger.
fn apply(ledger: &Ledger, operation: Operation) -> Result<(), String> {
    match operation {
        Operation::Customer(new) => {
            ledger.create_customer(new).map_err(|e| e.to_string())?;
        }
        Operation::Account { national_id, account } => {
            let customer = ledger
                .customer_by_national_id(&national_id)
                .ok_or_else(|| format!("no customer with national ID {national_id}"))?;
            ledger
                .create_account(NewAccount {
                    number: account.number,
                    kind: account.kind,
                    initial_balance: account.initial_balance,
                    active: true,
                    customer_id: customer.id,
                })
                .map_err(|e| e.to_string())?;
        }
        Operation::Post { number, kind, value } => {
            let account = ledger
                .account_by_number(&number)
                .ok_or_else(|| format!("no account with number {number}"))?;
            ledger.post(account.id, kind, value).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

/// Process ledger operations from a CSV reader.
///
/// Streaming parse; malformed rows and rejected operations are logged and
/// skipped without stopping the run.
///
/// # CSV Format
///
/// Expected columns: `op, name, gender, age, national_id, account, kind, value`
/// - `op`: Operation (customer, account, credit, debit)
/// - `name`, `gender`, `age`, `national_id`: customer rows
/// - `national_id`, `account`, `kind` (savings|checking), `value`: account rows, value = initial balance
/// - `account`, `value`: credit/debit rows
///
/// # Example
///
/// ```csv
/// op,name,gender,age,national_id,account,kind,value
/// customer,Jose Lema,male,34,1234567890,,,
/// account,,,,1234567890,478758,savings,2000
/// credit,,,,,478758,,600
/// debit,,,,,478758,,550
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid.
pub fn process_operations<R: Read>(reader: R) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(operation) = record.into_operation() else {
                    warn!("skipping invalid operation record");
                    continue;
                };

                if let Err(reason) = apply(&ledger, operation) {
                    warn!(%reason, "skipping rejected operation");
                }
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed row");
                continue;
            }
        }
    }

    Ok(ledger)
}

/// Write account states to a CSV writer.
///
/// Outputs all accounts with balances rounded to 2 decimal places.
///
/// # CSV Format
///
/// Columns: `account, kind, initial_balance, balance, active`
///
/// # Example
///
/// ```csv
/// account,kind,initial_balance,balance,active
/// 478758,savings,2000.00,2050.00,true
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_accounts<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    const PRECISION: u32 = 2;

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["account", "kind", "initial_balance", "balance", "active"])?;

    for account in ledger.accounts() {
        let balance = ledger
            .current_balance(account.id)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let kind = account.kind.to_string();
        let initial_balance = format!("{:.2}", account.initial_balance.round_dp(PRECISION));
        let balance = format!("{:.2}", balance.round_dp(PRECISION));
        let active = account.active.to_string();
        wtr.write_record([
            account.number.as_str(),
            kind.as_str(),
            initial_balance.as_str(),
            balance.as_str(),
            active.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const HEADER: &str = "op,name,gender,age,national_id,account,kind,value\n";

    #[test]
    fn parse_customer_and_account() {
        let csv = format!(
            "{HEADER}customer,Jose Lema,male,34,1234567890,,,\n\
             account,,,,1234567890,478758,savings,2000\n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();

        let account = ledger.account_by_number("478758").unwrap();
        assert_eq!(account.initial_balance, dec!(2000));
        assert_eq!(ledger.current_balance(account.id).unwrap(), dec!(2000));
    }

    #[test]
    fn parse_credit_and_debit() {
        let csv = format!(
            "{HEADER}customer,Jose Lema,male,34,1234567890,,,\n\
             account,,,,1234567890,478758,savings,2000\n\
             credit,,,,,478758,,600\n\
             debit,,,,,478758,,550\n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();

        let account = ledger.account_by_number("478758").unwrap();
        assert_eq!(ledger.current_balance(account.id).unwrap(), dec!(2050));
    }

    #[test]
    fn rejected_operation_does_not_stop_processing() {
        // The oversized debit is rejected; the following credit lands.
        let csv = format!(
            "{HEADER}customer,Jose Lema,male,34,1234567890,,,\n\
             account,,,,1234567890,478758,savings,100\n\
             debit,,,,,478758,,500\n\
             credit,,,,,478758,,25\n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();

        let account = ledger.account_by_number("478758").unwrap();
        assert_eq!(ledger.current_balance(account.id).unwrap(), dec!(125));
    }

    #[test]
    fn skip_malformed_rows() {
        let csv = format!(
            "{HEADER}customer,Jose Lema,male,34,1234567890,,,\n\
             bogus,row,data,here,,,,\n\
             account,,,,1234567890,478758,savings,2000\n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();
        assert_eq!(ledger.accounts().len(), 1);
    }

    #[test]
    fn parse_with_whitespace() {
        let csv = format!(
            "{HEADER} customer , Jose Lema , male , 34 , 1234567890 ,,,\n\
             account,,,, 1234567890 , 478758 , savings , 2000 \n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();
        assert!(ledger.account_by_number("478758").is_some());
    }

    #[test]
    fn write_accounts_to_csv() {
        let csv = format!(
            "{HEADER}customer,Jose Lema,male,34,1234567890,,,\n\
             account,,,,1234567890,478758,savings,2000\n\
             credit,,,,,478758,,50.5\n"
        );
        let ledger = process_operations(Cursor::new(csv)).unwrap();

        let mut output = Vec::new();
        write_accounts(&ledger, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("account,kind,initial_balance,balance,active"));
        assert!(output_str.contains("478758,savings,2000.00,2050.50,true"));
    }

    #[test]
    fn account_for_unknown_customer_skipped() {
        let csv = format!("{HEADER}account,,,,404,478758,savings,2000\n");
        let ledger = process_operations(Cursor::new(csv)).unwrap();
        assert!(ledger.accounts().is_empty());
    }
}
