//! Stock on hand and its movement journal.

pub mod domain;
mod service;

pub use domain::{
    InventoryValuation, MovementFilter, MovementKind, StockAdjustment, StockChange, StockMovement,
};
pub use service::InventoryService;
