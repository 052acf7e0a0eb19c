use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Money, ProductId, SupplierId};
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }

    fn set_id(&mut self, id: SupplierId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Selling price per unit.
    pub unit_price: Money,
    /// Purchase cost per unit.
    pub cost_price: Money,
    /// Stock on hand; only inventory movements change it.
    pub quantity: i64,
    pub reorder_level: i64,
    pub supplier_id: Option<SupplierId>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.active && self.quantity <= self.reorder_level
    }
}

impl Record for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }

    fn set_id(&mut self, id: ProductId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial supplier update. `null` clears an optional field, absence keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub unit_price: Money,
    #[serde(default)]
    pub cost_price: Money,
    /// Opening stock, recorded as an adjustment movement.
    #[serde(default)]
    pub initial_quantity: i64,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub unit_price: Option<Money>,
    #[serde(default)]
    pub cost_price: Option<Money>,
    #[serde(default)]
    pub reorder_level: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_id: Option<Option<SupplierId>>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        if self.active.is_some_and(|active| active != supplier.active) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => [
                Some(supplier.name.as_str()),
                supplier.contact_name.as_deref(),
                supplier.email.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| contains_ignore_case(field, needle)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub low_stock: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if self.active.is_some_and(|active| active != product.active) {
            return false;
        }
        if self.supplier_id.is_some() && self.supplier_id != product.supplier_id {
            return false;
        }
        if let Some(category) = self.category.as_deref() {
            if !product
                .category
                .as_deref()
                .is_some_and(|value| value.eq_ignore_ascii_case(category))
            {
                return false;
            }
        }
        if self.low_stock && !product.is_low_stock() {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                contains_ignore_case(&product.name, needle)
                    || contains_ignore_case(&product.sku, needle)
            }
            None => true,
        }
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
