//! Storage seams used by the services.
//!
//! Only in-memory backends ship today; a database adapter implements the same traits.

mod memory;

pub use memory::{MemoryRepository, MemorySequences};

/// Entities that can be kept in a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Copy + Ord + From<u64> + Into<u64> + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
    fn set_id(&mut self, id: Self::Id);
}

/// Storage abstraction so the services can be exercised in isolation.
pub trait Repository<T: Record>: Send + Sync {
    /// Stores a new record, assigning the next identifier.
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn update(&self, record: T) -> Result<(), RepositoryError>;
    fn fetch(&self, id: T::Id) -> Result<Option<T>, RepositoryError>;
    /// All records in identifier order.
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
    fn delete(&self, id: T::Id) -> Result<(), RepositoryError>;
}

/// Monotonic counters keyed by an arbitrary string, starting at 1.
pub trait SequenceStore: Send + Sync {
    fn next_value(&self, key: &str) -> Result<u32, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
