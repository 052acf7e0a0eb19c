//! Purchase orders placed with suppliers.

pub mod domain;
mod service;

pub use domain::{
    NewOrderLine, NewPurchaseOrder, OrderLine, PurchaseOrder, PurchaseOrderFilter,
    PurchaseOrderUpdate,
};
pub use service::PurchasingService;
