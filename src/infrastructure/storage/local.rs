use crate::common::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Filesystem layout for everything the service writes: original uploads,
/// chunked-upload segments, converted outputs and derived artifacts.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn originals_dir(&self) -> PathBuf {
        self.root.join("originals")
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.root.join("converted")
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join("thumbnails")
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.root.join("previews")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join("chunks")
    }

    pub async fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [
            self.originals_dir(),
            self.converted_dir(),
            self.thumbnails_dir(),
            self.previews_dir(),
            self.chunks_dir(),
        ] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }

    /// Random storage name preserving the original extension, so uploads
    /// with colliding filenames never overwrite each other.
    pub fn storage_name(original_filename: &str) -> String {
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4().as_simple(), ext)
    }

    pub fn original_path(&self, original_filename: &str) -> PathBuf {
        self.originals_dir().join(Self::storage_name(original_filename))
    }

    /// Deterministic output location for a conversion job. Job ids are unique
    /// and monotonically assigned, so collisions are impossible.
    pub fn converted_path(&self, job_id: i64, target_format: &str) -> PathBuf {
        self.converted_dir().join(format!("{}.{}", job_id, target_format))
    }

    pub fn thumbnail_path(&self, asset_id: i64) -> PathBuf {
        self.thumbnails_dir().join(format!("{}.jpg", asset_id))
    }

    pub fn preview_path(&self, asset_id: i64) -> PathBuf {
        self.previews_dir().join(format!("{}.mp4", asset_id))
    }

    /// Persist one chunk of a chunked upload. Writing the same (session,
    /// index) pair again replaces the previous segment, which makes client
    /// retries idempotent.
    pub async fn write_chunk(
        &self,
        upload_id: &str,
        chunk_index: u32,
        data: &[u8],
    ) -> Result<PathBuf, AppError> {
        let session_dir = self.chunks_dir().join(upload_id);
        fs::create_dir_all(&session_dir).await?;
        let chunk_path = session_dir.join(format!("{}.part", chunk_index));
        let mut file = fs::File::create(&chunk_path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(chunk_path)
    }

    /// Concatenate all received segments for a session in ascending numeric
    /// index order into a new original file, then delete the session.
    ///
    /// Index gaps are not rejected here; completeness is the caller's
    /// responsibility. They are logged so a short assembly can be traced.
    pub async fn assemble_chunks(
        &self,
        upload_id: &str,
        original_filename: &str,
    ) -> Result<(PathBuf, u64), AppError> {
        let session_dir = self.chunks_dir().join(upload_id);
        if !session_dir.is_dir() {
            return Err(AppError::SessionNotFound(upload_id.to_string()));
        }

        let mut indices: Vec<u32> = Vec::new();
        let mut entries = fs::read_dir(&session_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            if let Some(index) = stem.and_then(|s| s.parse::<u32>().ok()) {
                indices.push(index);
            }
        }
        if indices.is_empty() {
            return Err(AppError::SessionNotFound(upload_id.to_string()));
        }
        indices.sort_unstable();

        let gaps: Vec<u32> = indices
            .windows(2)
            .flat_map(|w| w[0] + 1..w[1])
            .collect();
        if !gaps.is_empty() {
            warn!(
                "upload session {} assembled with missing chunk indices {:?}",
                upload_id, gaps
            );
        }

        let destination = self.original_path(original_filename);
        let mut output = fs::File::create(&destination).await?;
        let mut size: u64 = 0;
        for index in &indices {
            let part = session_dir.join(format!("{}.part", index));
            let mut input = fs::File::open(&part).await?;
            size += tokio::io::copy(&mut input, &mut output).await?;
        }
        output.flush().await?;

        for index in &indices {
            let _ = fs::remove_file(session_dir.join(format!("{}.part", index))).await;
        }
        let _ = fs::remove_dir(&session_dir).await;

        Ok((destination, size))
    }
}

/// Final path segment only, safe to hand out as a download filename.
pub fn safe_filename(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .to_string()
}
