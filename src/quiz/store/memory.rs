use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{RecordUpdate, StoreError, UserRecord, UserRecordStore};

#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl UserRecordStore for MemoryRecordStore {
    async fn get(
        &self,
        user_id: &str,
        rows: usize,
        cols: usize,
        actions: usize,
    ) -> Result<UserRecord, StoreError> {
        let mut records = self.records.write();
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord::new(rows, cols, actions));
        record.ensure_table(rows, cols, actions);
        Ok(record.clone())
    }

    async fn put(&self, user_id: &str, update: RecordUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }
        let mut records = self.records.write();
        records
            .entry(user_id.to_string())
            .or_insert_with(UserRecord::without_table)
            .apply(update);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
