use crate::common::error::AppError;
use anyhow::anyhow;
use axum::extract::multipart::Field;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::error;

/// Stream a multipart field to a file on disk, returning the byte count.
/// The destination is removed again if the stream breaks mid-transfer.
pub async fn stream_to_file(mut field: Field<'_>, dest: &Path) -> Result<u64, AppError> {
    let mut file = File::create(dest).await?;
    let mut written: u64 = 0;

    loop {
        let chunk = match field.chunk().await {
            Ok(Some(c)) => c,
            Ok(None) => break,
            Err(e) => {
                error!("upload stream error: {}", e);
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(AppError::Internal(anyhow!("upload stream interrupted")));
            }
        };
        written += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(written)
}
