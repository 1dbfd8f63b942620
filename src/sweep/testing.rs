//! In-memory catalog for exercising the sweep pipeline without HTTP.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::catalog::{
    CatalogError, CatalogItem, CatalogReader, CatalogResult, CatalogWriter, ItemId, Page,
    parse_tags,
};

/// A listed item with the given id and raw tag string, created at a fixed
/// instant long in the past.
pub(crate) fn item(id: u64, tags: &str) -> CatalogItem {
    CatalogItem {
        id: ItemId::from(id),
        title: format!("Konfigurator: Item {}", id),
        tags: parse_tags(tags),
        created_at: Some(DateTime::<Utc>::UNIX_EPOCH),
        status: Some("active".to_string()),
    }
}

/// Like [`item`], created `age_minutes` before `now`.
pub(crate) fn aged_item(id: u64, tags: &str, now: DateTime<Utc>, age_minutes: i64) -> CatalogItem {
    CatalogItem {
        created_at: Some(now - Duration::minutes(age_minutes)),
        ..item(id, tags)
    }
}

enum Script {
    Pages(Vec<Vec<CatalogItem>>),
    /// Every page holds this many fresh items and advertises another page.
    Endless(usize),
}

/// Serves scripted pages using cursors `page-1`, `page-2`, ... and records
/// every call.
pub(crate) struct ScriptedCatalog {
    script: Script,
    fail_list_at: Option<usize>,
    delete_failures: HashMap<ItemId, u16>,
    list_calls: AtomicUsize,
    cursors: Mutex<Vec<Option<String>>>,
    page_sizes: Mutex<Vec<u32>>,
    deletes: Mutex<Vec<ItemId>>,
}

impl ScriptedCatalog {
    pub(crate) fn with_pages(pages: Vec<Vec<CatalogItem>>) -> Self {
        Self::new(Script::Pages(pages))
    }

    pub(crate) fn endless(items_per_page: usize) -> Self {
        Self::new(Script::Endless(items_per_page))
    }

    fn new(script: Script) -> Self {
        Self {
            script,
            fail_list_at: None,
            delete_failures: HashMap::new(),
            list_calls: AtomicUsize::new(0),
            cursors: Mutex::new(Vec::new()),
            page_sizes: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    /// The list call with this 0-based index answers 502.
    pub(crate) fn fail_list_at(mut self, call: usize) -> Self {
        self.fail_list_at = Some(call);
        self
    }

    /// Deleting `id` answers with `status`.
    pub(crate) fn fail_delete(mut self, id: u64, status: u16) -> Self {
        self.delete_failures.insert(ItemId::from(id), status);
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cursors_seen(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub(crate) fn page_sizes_seen(&self) -> Vec<u32> {
        self.page_sizes.lock().unwrap().clone()
    }

    pub(crate) fn deletes(&self) -> Vec<ItemId> {
        self.deletes.lock().unwrap().clone()
    }

    fn page_index(cursor: Option<&str>) -> usize {
        cursor
            .and_then(|c| c.strip_prefix("page-"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl CatalogReader for ScriptedCatalog {
    async fn list_page(&self, cursor: Option<&str>, page_size: u32) -> CatalogResult<Page> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(cursor.map(str::to_owned));
        self.page_sizes.lock().unwrap().push(page_size);

        if self.fail_list_at == Some(call) {
            return Err(CatalogError::Remote {
                status: 502,
                body: "Bad Gateway".to_string(),
            });
        }

        let index = Self::page_index(cursor);
        let next = Some(format!("page-{}", index + 1));

        Ok(match &self.script {
            Script::Pages(pages) => Page {
                items: pages.get(index).cloned().unwrap_or_default(),
                next_cursor: next.filter(|_| index + 1 < pages.len()),
            },
            Script::Endless(per_page) => Page {
                items: (0..*per_page)
                    .map(|n| item((index * per_page + n + 1) as u64, "auto-delete-1h"))
                    .collect(),
                next_cursor: next,
            },
        })
    }
}

#[async_trait]
impl CatalogWriter for ScriptedCatalog {
    async fn delete(&self, id: &ItemId) -> CatalogResult<()> {
        self.deletes.lock().unwrap().push(id.clone());

        match self.delete_failures.get(id) {
            Some(&status) => Err(CatalogError::Remote {
                status,
                body: format!("cannot delete {}", id),
            }),
            None => Ok(()),
        }
    }
}
