mod ids;
mod money;
mod page;
mod status;

pub use ids::{MovementId, ProductId, PurchaseOrderId, SupplierId, TransactionId, UserId};
pub use money::Money;
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use status::OrderStatus;
