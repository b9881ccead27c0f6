use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::{
    error::{CoverforgeError, CoverforgeResult},
    model::{BookCover, CoverData},
};

/// Storage seam for the persisted catalog: one opaque blob holding the whole
/// JSON-serialized collection. Keeping the seam this small makes the catalog
/// testable against an in-memory fake.
pub trait CatalogStore {
    /// Raw persisted collection, or `None` when nothing was ever stored.
    fn get(&self) -> CoverforgeResult<Option<String>>;

    /// Replace the persisted collection.
    fn set(&mut self, raw: &str) -> CoverforgeResult<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, for exercising corrupt or legacy payloads.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }
}

impl CatalogStore for MemoryStore {
    fn get(&self) -> CoverforgeResult<Option<String>> {
        Ok(self.raw.clone())
    }

    fn set(&mut self, raw: &str) -> CoverforgeResult<()> {
        self.raw = Some(raw.to_string());
        Ok(())
    }
}

/// File-backed store: the whole collection lives in one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogStore for JsonFileStore {
    fn get(&self) -> CoverforgeResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoverforgeError::persistence(format!(
                "read catalog '{}': {e}",
                self.path.display()
            ))),
        }
    }

    fn set(&mut self, raw: &str) -> CoverforgeResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create catalog dir '{}'", parent.display()))?;
        }
        std::fs::write(&self.path, raw).map_err(|e| {
            CoverforgeError::persistence(format!(
                "write catalog '{}': {e}",
                self.path.display()
            ))
        })
    }
}

/// Durable, ordered collection of saved covers, newest first.
pub struct CoverCatalog<S: CatalogStore> {
    store: S,
    covers: Vec<BookCover>,
}

impl<S: CatalogStore> CoverCatalog<S> {
    /// Open a catalog over a store. An empty, uninitialized, or corrupt
    /// store initializes an empty collection rather than failing.
    pub fn open(store: S) -> Self {
        let covers = match store.get() {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<BookCover>>(&raw) {
                Ok(covers) => covers,
                Err(e) => {
                    tracing::warn!("stored catalog is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("stored catalog is unreadable, starting empty: {e}");
                Vec::new()
            }
        };
        Self { store, covers }
    }

    /// Read-only view, insertion order preserved (newest first).
    pub fn list(&self) -> &[BookCover] {
        &self.covers
    }

    /// Deep copy of one stored snapshot, suitable for overwriting the editor
    /// state wholesale. The catalog keeps exclusive ownership of its records.
    pub fn load(&self, id: &str) -> Option<CoverData> {
        self.covers.iter().find(|c| c.id == id).map(|c| c.data.clone())
    }

    /// Snapshot the cover into a fresh immutable record at the front of the
    /// collection and persist the whole updated list.
    pub fn save(&mut self, cover: CoverData) -> CoverforgeResult<&BookCover> {
        if cover.background_image.is_none() {
            return Err(CoverforgeError::validation(
                "cannot save a cover without a background image",
            ));
        }
        cover.validate()?;

        let record = BookCover {
            id: fresh_id(),
            created_at: chrono::Utc::now(),
            data: cover,
        };
        self.covers.insert(0, record);
        self.persist()?;
        Ok(&self.covers[0])
    }

    /// Remove the record with the matching id; a missing id is a no-op.
    /// Returns whether a record was removed.
    pub fn delete(&mut self, id: &str) -> CoverforgeResult<bool> {
        let before = self.covers.len();
        self.covers.retain(|c| c.id != id);
        if self.covers.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> CoverforgeResult<()> {
        let raw = serde_json::to_string(&self.covers)
            .map_err(|e| CoverforgeError::serde(format!("encode catalog: {e}")))?;
        self.store.set(&raw)
    }
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque record id: millisecond timestamp plus a process-wide counter, so
/// ids created later always compare greater.
fn fresh_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("c{millis:013}-{seq:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prompt::Genre, templates::TemplateKey};

    fn cover_with_background(title: &str) -> CoverData {
        let mut cover = CoverData::new(Genre::Thriller, TemplateKey::Ebook);
        cover.title.text = title.to_string();
        cover.background_image = Some("data:image/jpeg;base64,QUJDRA==".to_string());
        cover
    }

    #[test]
    fn save_requires_background() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        let bare = CoverData::new(Genre::Thriller, TemplateKey::Ebook);
        assert!(catalog.save(bare).is_err());
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn save_prepends_newest_first() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        catalog.save(cover_with_background("First")).unwrap();
        catalog.save(cover_with_background("Second")).unwrap();

        let titles: Vec<&str> = catalog
            .list()
            .iter()
            .map(|c| c.data.title.text.as_str())
            .collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        catalog.save(cover_with_background("a")).unwrap();
        catalog.save(cover_with_background("b")).unwrap();

        let newer = &catalog.list()[0];
        let older = &catalog.list()[1];
        assert_ne!(newer.id, older.id);
        assert!(newer.id > older.id);
        assert!(newer.created_at >= older.created_at);
    }

    #[test]
    fn delete_missing_id_is_a_noop() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        catalog.save(cover_with_background("Keep")).unwrap();
        let before: Vec<BookCover> = catalog.list().to_vec();

        assert!(!catalog.delete("no-such-id").unwrap());
        assert_eq!(catalog.list(), before.as_slice());
    }

    #[test]
    fn delete_only_record_leaves_empty_catalog() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        let id = catalog.save(cover_with_background("Only")).unwrap().id.clone();

        assert!(catalog.delete(&id).unwrap());
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn load_then_save_creates_an_independent_record() {
        let mut catalog = CoverCatalog::open(MemoryStore::new());
        let original_id = catalog
            .save(cover_with_background("Original"))
            .unwrap()
            .id
            .clone();

        let loaded = catalog.load(&original_id).unwrap();
        let resaved = catalog.save(loaded.clone()).unwrap();
        assert_ne!(resaved.id, original_id);
        assert_eq!(resaved.data, loaded);
    }

    #[test]
    fn load_missing_id_is_none() {
        let catalog = CoverCatalog::open(MemoryStore::new());
        assert!(catalog.load("nope").is_none());
    }

    #[test]
    fn corrupt_store_initializes_empty() {
        for raw in ["not json", "{\"covers\":1}", "[{\"id\":42}]"] {
            let catalog = CoverCatalog::open(MemoryStore::with_raw(raw));
            assert!(catalog.list().is_empty(), "{raw}");
        }
    }

    #[test]
    fn empty_store_initializes_empty() {
        let catalog = CoverCatalog::open(MemoryStore::new());
        assert!(catalog.list().is_empty());
    }
}
