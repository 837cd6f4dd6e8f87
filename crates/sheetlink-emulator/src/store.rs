use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheetlink_core::Request;
use tokio::sync::RwLock;

/// One accepted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedBatch {
    /// Position in the spreadsheet's history, starting at 1
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
    pub requests: Vec<Request>,
}

/// Transactions applied to one spreadsheet, oldest first
#[derive(Debug, Default)]
pub struct Spreadsheet {
    batches: Vec<RecordedBatch>,
}

impl Spreadsheet {
    pub fn record(&mut self, requests: Vec<Request>) -> &RecordedBatch {
        let sequence = self.batches.len() as u64 + 1;
        self.batches.push(RecordedBatch {
            sequence,
            received_at: Utc::now(),
            requests,
        });
        &self.batches[self.batches.len() - 1]
    }

    pub fn batches(&self) -> &[RecordedBatch] {
        &self.batches
    }
}

/// Store for all spreadsheets the emulator has seen
pub struct SpreadsheetStore {
    spreadsheets: RwLock<HashMap<String, Arc<RwLock<Spreadsheet>>>>,
}

impl SpreadsheetStore {
    pub fn new() -> Self {
        Self {
            spreadsheets: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the spreadsheet with this id
    pub async fn get_or_create(&self, spreadsheet_id: &str) -> Arc<RwLock<Spreadsheet>> {
        {
            let sheets = self.spreadsheets.read().await;
            if let Some(sheet) = sheets.get(spreadsheet_id) {
                return Arc::clone(sheet);
            }
        }

        let mut sheets = self.spreadsheets.write().await;
        // Double-check after acquiring write lock
        if let Some(sheet) = sheets.get(spreadsheet_id) {
            return Arc::clone(sheet);
        }

        let sheet = Arc::new(RwLock::new(Spreadsheet::default()));
        sheets.insert(spreadsheet_id.to_string(), Arc::clone(&sheet));
        sheet
    }

    pub async fn get(&self, spreadsheet_id: &str) -> Option<Arc<RwLock<Spreadsheet>>> {
        self.spreadsheets.read().await.get(spreadsheet_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.spreadsheets.read().await.len()
    }
}

impl Default for SpreadsheetStore {
    fn default() -> Self {
        Self::new()
    }
}
