use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::domain::{
    NewProduct, NewSupplier, Product, ProductFilter, ProductUpdate, Supplier, SupplierFilter,
    SupplierUpdate,
};
use crate::domain::{Money, Page, PageRequest, ProductId, SupplierId, UserId};
use crate::error::ServiceError;
use crate::inventory::{InventoryService, MovementKind, StockChange};
use crate::purchasing::PurchaseOrder;
use crate::store::Repository;
use crate::transactions::Transaction;

/// Suppliers and products.
pub struct CatalogService {
    suppliers: Arc<dyn Repository<Supplier>>,
    products: Arc<dyn Repository<Product>>,
    orders: Arc<dyn Repository<PurchaseOrder>>,
    transactions: Arc<dyn Repository<Transaction>>,
    inventory: Arc<InventoryService>,
}

impl CatalogService {
    pub fn new(
        suppliers: Arc<dyn Repository<Supplier>>,
        products: Arc<dyn Repository<Product>>,
        orders: Arc<dyn Repository<PurchaseOrder>>,
        transactions: Arc<dyn Repository<Transaction>>,
        inventory: Arc<InventoryService>,
    ) -> Self {
        Self {
            suppliers,
            products,
            orders,
            transactions,
            inventory,
        }
    }

    pub fn create_supplier(&self, new_supplier: NewSupplier) -> Result<Supplier, ServiceError> {
        let name = required(&new_supplier.name, "name")?;
        let _guard = self.inventory.lock();
        self.ensure_unique_supplier_name(&name, None)?;

        let now = Utc::now();
        let supplier = self.suppliers.insert(Supplier {
            id: SupplierId(0),
            name,
            contact_name: optional(new_supplier.contact_name),
            email: optional(new_supplier.email),
            phone: optional(new_supplier.phone),
            address: optional(new_supplier.address),
            active: true,
            created_at: now,
            updated_at: now,
        })?;
        info!(supplier_id = %supplier.id, name = %supplier.name, "supplier created");
        Ok(supplier)
    }

    pub fn supplier(&self, id: SupplierId) -> Result<Supplier, ServiceError> {
        self.suppliers
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("supplier", id))
    }

    pub fn suppliers(
        &self,
        filter: &SupplierFilter,
        page: &PageRequest,
    ) -> Result<Page<Supplier>, ServiceError> {
        let mut suppliers: Vec<Supplier> = self
            .suppliers
            .list()?
            .into_iter()
            .filter(|supplier| filter.matches(supplier))
            .collect();
        suppliers.sort_by_key(|supplier| supplier.name.to_lowercase());
        Ok(Page::paginate(suppliers, page))
    }

    pub fn update_supplier(
        &self,
        id: SupplierId,
        update: SupplierUpdate,
    ) -> Result<Supplier, ServiceError> {
        let _guard = self.inventory.lock();
        let mut supplier = self.supplier(id)?;

        if let Some(name) = update.name {
            let name = required(&name, "name")?;
            self.ensure_unique_supplier_name(&name, Some(id))?;
            supplier.name = name;
        }
        if let Some(contact_name) = update.contact_name {
            supplier.contact_name = optional(contact_name);
        }
        if let Some(email) = update.email {
            supplier.email = optional(email);
        }
        if let Some(phone) = update.phone {
            supplier.phone = optional(phone);
        }
        if let Some(address) = update.address {
            supplier.address = optional(address);
        }
        if let Some(active) = update.active {
            supplier.active = active;
        }
        supplier.updated_at = Utc::now();

        self.suppliers.update(supplier.clone())?;
        info!(supplier_id = %supplier.id, "supplier updated");
        Ok(supplier)
    }

    pub fn delete_supplier(&self, id: SupplierId) -> Result<(), ServiceError> {
        let _guard = self.inventory.lock();
        self.supplier(id)?;

        let referenced = self
            .products
            .list()?
            .iter()
            .any(|product| product.supplier_id == Some(id))
            || self
                .orders
                .list()?
                .iter()
                .any(|order| order.supplier_id == id);
        if referenced {
            return Err(ServiceError::conflict(format!(
                "supplier {id} is referenced by products or purchase orders; deactivate it instead"
            )));
        }

        self.suppliers.delete(id)?;
        info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }

    pub fn create_product(
        &self,
        new_product: NewProduct,
        actor: Option<UserId>,
    ) -> Result<Product, ServiceError> {
        let sku = required(&new_product.sku, "sku")?;
        let name = required(&new_product.name, "name")?;
        validate_price(new_product.unit_price, "unit_price")?;
        validate_price(new_product.cost_price, "cost_price")?;
        if new_product.reorder_level < 0 {
            return Err(ServiceError::validation("reorder_level must not be negative"));
        }
        if new_product.initial_quantity < 0 {
            return Err(ServiceError::validation(
                "initial_quantity must not be negative",
            ));
        }
        let _guard = self.inventory.lock();
        if let Some(supplier_id) = new_product.supplier_id {
            self.supplier(supplier_id)?;
        }
        self.ensure_unique_sku(&sku, None)?;

        let now = Utc::now();
        let product = self.products.insert(Product {
            id: ProductId(0),
            sku,
            name,
            description: optional(new_product.description),
            category: optional(new_product.category),
            unit_price: new_product.unit_price,
            cost_price: new_product.cost_price,
            quantity: 0,
            reorder_level: new_product.reorder_level,
            supplier_id: new_product.supplier_id,
            active: true,
            created_at: now,
            updated_at: now,
        })?;
        info!(product_id = %product.id, sku = %product.sku, "product created");

        if new_product.initial_quantity == 0 {
            return Ok(product);
        }

        let opening = StockChange::new(
            product.id,
            new_product.initial_quantity,
            MovementKind::Adjustment,
        )
        .with_note(Some("opening balance".to_string()));
        self.inventory.apply_locked(vec![opening], actor)?;
        self.product(product.id)
    }

    pub fn product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("product", id))
    }

    pub fn products(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<Page<Product>, ServiceError> {
        let mut products: Vec<Product> = self
            .products
            .list()?
            .into_iter()
            .filter(|product| filter.matches(product))
            .collect();
        products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(Page::paginate(products, page))
    }

    /// Distinct product categories, sorted.
    pub fn categories(&self) -> Result<Vec<String>, ServiceError> {
        let mut categories: Vec<String> = self
            .products
            .list()?
            .into_iter()
            .filter_map(|product| product.category)
            .collect();
        categories.sort_by_cached_key(|category| category.to_lowercase());
        categories.dedup_by_key(|category| category.to_lowercase());
        Ok(categories)
    }

    pub fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ServiceError> {
        let _guard = self.inventory.lock();
        if let Some(Some(supplier_id)) = update.supplier_id {
            self.supplier(supplier_id)?;
        }
        let mut product = self.product(id)?;

        if let Some(sku) = update.sku {
            let sku = required(&sku, "sku")?;
            self.ensure_unique_sku(&sku, Some(id))?;
            product.sku = sku;
        }
        if let Some(name) = update.name {
            product.name = required(&name, "name")?;
        }
        if let Some(description) = update.description {
            product.description = optional(description);
        }
        if let Some(category) = update.category {
            product.category = optional(category);
        }
        if let Some(unit_price) = update.unit_price {
            validate_price(unit_price, "unit_price")?;
            product.unit_price = unit_price;
        }
        if let Some(cost_price) = update.cost_price {
            validate_price(cost_price, "cost_price")?;
            product.cost_price = cost_price;
        }
        if let Some(reorder_level) = update.reorder_level {
            if reorder_level < 0 {
                return Err(ServiceError::validation("reorder_level must not be negative"));
            }
            product.reorder_level = reorder_level;
        }
        if let Some(supplier_id) = update.supplier_id {
            product.supplier_id = supplier_id;
        }
        if let Some(active) = update.active {
            product.active = active;
        }
        product.updated_at = Utc::now();

        self.products.update(product.clone())?;
        info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    pub fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        let _guard = self.inventory.lock();
        self.product(id)?;

        let referenced = self
            .orders
            .list()?
            .iter()
            .any(|order| order.lines.iter().any(|line| line.product_id == id))
            || self
                .transactions
                .list()?
                .iter()
                .any(|transaction| transaction.lines.iter().any(|line| line.product_id == id));
        if referenced {
            return Err(ServiceError::conflict(format!(
                "product {id} appears on orders or transactions; deactivate it instead"
            )));
        }

        self.products.delete(id)?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    fn ensure_unique_supplier_name(
        &self,
        name: &str,
        except: Option<SupplierId>,
    ) -> Result<(), ServiceError> {
        let taken = self.suppliers.list()?.iter().any(|supplier| {
            Some(supplier.id) != except && supplier.name.eq_ignore_ascii_case(name)
        });
        if taken {
            return Err(ServiceError::conflict(format!(
                "supplier '{name}' already exists"
            )));
        }
        Ok(())
    }

    fn ensure_unique_sku(&self, sku: &str, except: Option<ProductId>) -> Result<(), ServiceError> {
        let taken = self
            .products
            .list()?
            .iter()
            .any(|product| Some(product.id) != except && product.sku.eq_ignore_ascii_case(sku));
        if taken {
            return Err(ServiceError::conflict(format!("sku '{sku}' already exists")));
        }
        Ok(())
    }
}

fn required(value: &str, field: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn validate_price(price: Money, field: &str) -> Result<(), ServiceError> {
    if price.is_negative() {
        return Err(ServiceError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}
