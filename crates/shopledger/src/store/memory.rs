use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Record, Repository, RepositoryError, SequenceStore};

struct Table<T: Record> {
    next_id: u64,
    rows: BTreeMap<T::Id, T>,
}

/// Process-local repository backed by an ordered map.
pub struct MemoryRepository<T: Record> {
    table: Arc<Mutex<Table<T>>>,
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl<T: Record> Clone for MemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn len(&self) -> usize {
        self.table.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn insert(&self, mut record: T) -> Result<T, RepositoryError> {
        let mut table = self.table.lock();
        let id = T::Id::from(table.next_id);
        if table.rows.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        table.next_id += 1;
        record.set_id(id);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut table = self.table.lock();
        match table.rows.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        Ok(self.table.lock().rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.table.lock().rows.values().cloned().collect())
    }

    fn delete(&self, id: T::Id) -> Result<(), RepositoryError> {
        self.table
            .lock()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// In-memory [`SequenceStore`].
#[derive(Default, Clone)]
pub struct MemorySequences {
    counters: Arc<Mutex<HashMap<String, u32>>>,
}

impl SequenceStore for MemorySequences {
    fn next_value(&self, key: &str) -> Result<u32, RepositoryError> {
        let mut counters = self.counters.lock();
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable(format!("sequence {key} exhausted")))?;
        Ok(*counter)
    }
}
