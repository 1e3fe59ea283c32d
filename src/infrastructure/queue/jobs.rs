use crate::common::error::AppError;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Message telling a worker to start the conversion for one job. The record
/// itself lives in the job repository; workers re-read it on claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertMessage {
    pub job_id: i64,
}

/// In-process job queue. The receiver side is multi-consumer, so the worker
/// pool shares one channel without extra coordination.
#[derive(Clone)]
pub struct JobQueue {
    tx: async_channel::Sender<ConvertMessage>,
    rx: async_channel::Receiver<ConvertMessage>,
}

impl JobQueue {
    pub fn unbounded() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }

    pub async fn publish(&self, msg: ConvertMessage) -> Result<(), AppError> {
        self.tx
            .send(msg)
            .await
            .map_err(|e| AppError::Internal(anyhow!("job queue closed: {}", e)))
    }

    pub fn receiver(&self) -> async_channel::Receiver<ConvertMessage> {
        self.rx.clone()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
