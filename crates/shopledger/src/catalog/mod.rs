//! Suppliers and the product catalog.

pub mod domain;
mod service;

pub use domain::{
    NewProduct, NewSupplier, Product, ProductFilter, ProductUpdate, Supplier, SupplierFilter,
    SupplierUpdate,
};
pub use service::CatalogService;
