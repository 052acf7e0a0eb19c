//! Record keeping for a small business back office.
//!
//! The crate holds the domain model and services; `services/api` exposes them over HTTP.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod purchasing;
pub mod statistics;
pub mod store;
pub mod telemetry;
pub mod transactions;
