use super::model::Asset;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// Process-local asset store. Persistence is an external collaborator; this
/// keeps the durable-store contract (create, get by id, update as full-record
/// replace, list by owner newest-first) behind the same seam a database
/// repository would occupy.
#[derive(Clone, Default)]
pub struct AssetRepository {
    inner: Arc<AssetStore>,
}

#[derive(Default)]
struct AssetStore {
    rows: RwLock<HashMap<i64, Asset>>,
    seq: AtomicI64,
}

impl AssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next id and stores the record.
    pub fn create(&self, mut asset: Asset) -> Asset {
        asset.id = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let mut rows = self.inner.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.insert(asset.id, asset.clone());
        asset
    }

    pub fn get(&self, id: i64) -> Option<Asset> {
        let rows = self.inner.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&id).cloned()
    }

    pub fn get_owned(&self, id: i64, owner: &str) -> Option<Asset> {
        self.get(id).filter(|a| a.owner == owner)
    }

    /// Full-record replace. A record that was deleted concurrently stays gone.
    pub fn update(&self, asset: Asset) {
        let mut rows = self.inner.rows.write().unwrap_or_else(|e| e.into_inner());
        if let std::collections::hash_map::Entry::Occupied(mut entry) = rows.entry(asset.id) {
            entry.insert(asset);
        }
    }

    pub fn list_by_owner(&self, owner: &str) -> Vec<Asset> {
        let rows = self.inner.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut assets: Vec<Asset> = rows.values().filter(|a| a.owner == owner).cloned().collect();
        assets.sort_by(|a, b| b.id.cmp(&a.id));
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::asset::model::MediaKind;
    use time::OffsetDateTime;

    fn asset(owner: &str) -> Asset {
        Asset {
            id: 0,
            owner: owner.to_string(),
            kind: MediaKind::Video,
            original_filename: "clip.mp4".into(),
            original_format: "mp4".into(),
            resolution: Some("1920x1080".into()),
            duration_seconds: Some(120.0),
            file_size: 1024,
            path: "/tmp/clip.mp4".into(),
            thumbnail_path: None,
            preview_path: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let repo = AssetRepository::new();
        let first = repo.create(asset("a"));
        let second = repo.create(asset("a"));
        assert!(second.id > first.id);
    }

    #[test]
    fn ownership_scopes_reads_and_listing() {
        let repo = AssetRepository::new();
        let mine = repo.create(asset("me"));
        repo.create(asset("other"));

        assert!(repo.get_owned(mine.id, "me").is_some());
        assert!(repo.get_owned(mine.id, "other").is_none());

        let listed = repo.list_by_owner("me");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
    }

    #[test]
    fn listing_is_newest_first() {
        let repo = AssetRepository::new();
        let older = repo.create(asset("me"));
        let newer = repo.create(asset("me"));
        let listed = repo.list_by_owner("me");
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }
}
