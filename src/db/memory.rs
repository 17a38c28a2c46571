use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{CategoryRepository, RepoError, RepoResult, SheetRepository};
use crate::models::{
    Category, CategorySummary, DeletedSheet, DownloadTicket, NewSheet, Sheet, SheetFilter, SortKey,
};

#[derive(Default)]
struct State {
    next_sheet_id: i32,
    next_category_id: i32,
    sheets: BTreeMap<i32, Sheet>,
    categories: BTreeMap<i32, Category>,
}

/// In-memory repository with the same constraints as the SQL schema
///
/// One mutex guards all rows, so every operation is atomic with respect
/// to the others, like the single-statement queries of [`super::PgStore`].
#[derive(Default)]
pub struct MemorySheetStore {
    state: Mutex<State>,
    fail_inserts: AtomicBool,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sheet inserts fail, simulating a database outage after upload
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn sheet_count(&self) -> usize {
        self.state.lock().await.sheets.len()
    }
}

fn with_category_name(mut sheet: Sheet, categories: &BTreeMap<i32, Category>) -> Sheet {
    sheet.category_name = sheet
        .category_id
        .and_then(|id| categories.get(&id))
        .map(|c| c.name.clone());
    sheet
}

#[async_trait]
impl SheetRepository for MemorySheetStore {
    async fn insert(&self, sheet: NewSheet) -> RepoResult<Sheet> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("inserts disabled".to_string()));
        }
        if sheet.title.is_empty() {
            return Err(RepoError::Unavailable(
                "title violates non-empty constraint".to_string(),
            ));
        }

        let mut state = self.state.lock().await;
        if let Some(category_id) = sheet.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(RepoError::MissingReference(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }

        state.next_sheet_id += 1;
        let row = Sheet {
            id: state.next_sheet_id,
            title: sheet.title,
            category_id: sheet.category_id,
            file_url: sheet.file_url,
            remote_ref: sheet.remote_ref,
            download_count: 0,
            created_at: Utc::now(),
            category_name: None,
        };
        state.sheets.insert(row.id, row.clone());

        Ok(row)
    }

    async fn list(&self, filter: SheetFilter) -> RepoResult<Vec<Sheet>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Sheet> = state
            .sheets
            .values()
            .filter(|s| filter.category_id.map_or(true, |id| s.category_id == Some(id)))
            .cloned()
            .map(|s| with_category_name(s, &state.categories))
            .collect();

        match filter.sort {
            SortKey::Newest => {
                rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            }
            SortKey::Popular => rows.sort_by(|a, b| {
                (b.download_count, b.created_at, b.id).cmp(&(a.download_count, a.created_at, a.id))
            }),
        }

        Ok(rows)
    }

    async fn increment_download(&self, id: i32) -> RepoResult<Option<DownloadTicket>> {
        let mut state = self.state.lock().await;
        Ok(state.sheets.get_mut(&id).map(|sheet| {
            sheet.download_count += 1;
            DownloadTicket {
                file_url: sheet.file_url.clone(),
                download_count: sheet.download_count,
            }
        }))
    }

    async fn delete_returning(&self, id: i32) -> RepoResult<Option<DeletedSheet>> {
        let mut state = self.state.lock().await;
        Ok(state.sheets.remove(&id).map(|sheet| DeletedSheet {
            title: sheet.title,
            remote_ref: sheet.remote_ref,
        }))
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemorySheetStore {
    async fn list_with_counts(&self) -> RepoResult<Vec<CategorySummary>> {
        let state = self.state.lock().await;
        let mut summaries: Vec<CategorySummary> = state
            .categories
            .values()
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name.clone(),
                created_at: c.created_at,
                sheet_count: state
                    .sheets
                    .values()
                    .filter(|s| s.category_id == Some(c.id))
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    async fn create(&self, name: &str) -> RepoResult<Category> {
        let mut state = self.state.lock().await;
        if state.categories.values().any(|c| c.name == name) {
            return Err(RepoError::Conflict(format!("category '{}' exists", name)));
        }

        state.next_category_id += 1;
        let category = Category {
            id: state.next_category_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: i32) -> RepoResult<Option<Category>> {
        let mut state = self.state.lock().await;
        let removed = state.categories.remove(&id);
        if removed.is_some() {
            for sheet in state.sheets.values_mut() {
                if sheet.category_id == Some(id) {
                    sheet.category_id = None;
                }
            }
        }
        Ok(removed)
    }
}
