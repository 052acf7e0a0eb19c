use std::sync::Arc;

use crate::auth::{AuthService, User};
use crate::catalog::{CatalogService, Product, Supplier};
use crate::config::AuthConfig;
use crate::inventory::{InventoryService, StockMovement};
use crate::purchasing::{PurchaseOrder, PurchasingService};
use crate::statistics::StatisticsService;
use crate::store::{MemoryRepository, MemorySequences, Repository, SequenceStore};
use crate::transactions::{Transaction, TransactionService};

/// Storage handles for every entity.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn Repository<User>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub products: Arc<dyn Repository<Product>>,
    pub movements: Arc<dyn Repository<StockMovement>>,
    pub orders: Arc<dyn Repository<PurchaseOrder>>,
    pub transactions: Arc<dyn Repository<Transaction>>,
    pub sequences: Arc<dyn SequenceStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::default()),
            suppliers: Arc::new(MemoryRepository::<Supplier>::default()),
            products: Arc::new(MemoryRepository::<Product>::default()),
            movements: Arc::new(MemoryRepository::<StockMovement>::default()),
            orders: Arc::new(MemoryRepository::<PurchaseOrder>::default()),
            transactions: Arc::new(MemoryRepository::<Transaction>::default()),
            sequences: Arc::new(MemorySequences::default()),
        }
    }
}

/// All services wired against one set of stores.
#[derive(Clone)]
pub struct Ledger {
    pub auth: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub inventory: Arc<InventoryService>,
    pub purchasing: Arc<PurchasingService>,
    pub transactions: Arc<TransactionService>,
    pub statistics: Arc<StatisticsService>,
}

impl Ledger {
    pub fn in_memory(auth: &AuthConfig) -> Self {
        Self::new(Stores::in_memory(), auth)
    }

    pub fn new(stores: Stores, auth: &AuthConfig) -> Self {
        let inventory = Arc::new(InventoryService::new(
            stores.products.clone(),
            stores.movements.clone(),
        ));
        let transactions = Arc::new(TransactionService::new(
            stores.transactions.clone(),
            stores.products.clone(),
            stores.suppliers.clone(),
            stores.sequences.clone(),
            inventory.clone(),
        ));
        let purchasing = Arc::new(PurchasingService::new(
            stores.orders.clone(),
            stores.suppliers.clone(),
            stores.products.clone(),
            stores.sequences.clone(),
            inventory.clone(),
            transactions.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            stores.suppliers.clone(),
            stores.products.clone(),
            stores.orders.clone(),
            stores.transactions.clone(),
            inventory.clone(),
        ));
        let statistics = Arc::new(StatisticsService::new(
            stores.transactions.clone(),
            stores.products.clone(),
            stores.suppliers.clone(),
            stores.orders.clone(),
            inventory.clone(),
        ));

        Self {
            auth: Arc::new(AuthService::new(stores.users, auth)),
            catalog,
            inventory,
            purchasing,
            transactions,
            statistics,
        }
    }
}
