//! Sales and purchase transactions.

pub mod domain;
mod export;
pub mod numbering;
mod service;

pub use domain::{
    NewTransaction, NewTransactionLine, Transaction, TransactionFilter, TransactionKind,
    TransactionLine,
};
pub use export::{transactions_csv, ExportError};
pub use service::TransactionService;
