//! Batch verification pipeline: bounded scheduler plus result streamer.
//!
//! A submitted batch fans out into per-label work units behind a semaphore
//! admission gate; each completed unit is streamed back immediately, in
//! completion order. Work units share no mutable state with each other; the
//! progress counter is owned by the streamer and the admission gate is the
//! only other shared control point.

pub mod error;
pub mod progress;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::SubmitError;
pub use progress::BatchProgress;
pub use store::BatchStore;

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info};

use crate::extraction::{ExtractionMachine, FieldExtractor};
use crate::intake::{ImageBytes, ImageStore};
use crate::label::{
    BatchEvent, BatchSnapshot, LabelGroup, LabelResult, MAX_IMAGES_PER_GROUP,
};
use crate::verdict::{BeverageTypeResolver, KeywordResolver, resolve};

/// Default concurrency ceiling for in-flight label groups.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default maximum label groups per batch submission.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// A running batch: its identity and the completion event stream.
///
/// The receiver yields exactly one [`BatchEvent`] per label group and closes
/// after the event where `completed == total`. Dropping it abandons the
/// stream; in-flight units run to completion and are discarded, and no new
/// units are admitted.
pub struct BatchHandle {
    pub batch_id: String,
    pub total: u32,
    pub events: mpsc::Receiver<BatchEvent>,
}

/// The batch verification pipeline.
pub struct VerifyPipeline<E, S> {
    extractor: Arc<E>,
    images: Arc<S>,
    type_resolver: Arc<dyn BeverageTypeResolver>,
    store: BatchStore,
    concurrency: usize,
    max_batch_size: usize,
}

impl<E, S> VerifyPipeline<E, S>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    pub fn new(
        extractor: Arc<E>,
        images: Arc<S>,
        concurrency: usize,
        max_batch_size: usize,
    ) -> Self {
        Self {
            extractor,
            images,
            type_resolver: Arc::new(KeywordResolver),
            store: BatchStore::new(),
            concurrency,
            max_batch_size,
        }
    }

    /// Swaps the auto beverage-type inference strategy.
    pub fn with_type_resolver(mut self, resolver: Arc<dyn BeverageTypeResolver>) -> Self {
        self.type_resolver = resolver;
        self
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    /// Validates and admits a batch, returning its event stream.
    ///
    /// Shape violations are rejected here, before any work unit starts.
    pub fn submit(&self, groups: Vec<LabelGroup>) -> Result<BatchHandle, SubmitError> {
        if groups.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }
        if groups.len() > self.max_batch_size {
            return Err(SubmitError::BatchSizeExceeded {
                submitted: groups.len(),
                limit: self.max_batch_size,
            });
        }
        for group in &groups {
            let count = group.images.len();
            if count == 0 || count > MAX_IMAGES_PER_GROUP {
                return Err(SubmitError::ImageCountOutOfRange {
                    label_id: group.label_id.clone(),
                    count,
                });
            }
        }

        let batch_id = uuid::Uuid::new_v4().to_string();
        let total = groups.len() as u32;
        info!(batch_id = %batch_id, total_labels = total, "Batch admitted");

        let (unit_tx, mut unit_rx) = mpsc::channel::<LabelResult>(groups.len());
        let (event_tx, event_rx) = mpsc::channel::<BatchEvent>(groups.len());

        // Admission: sliding window behind the semaphore. A permit is taken
        // before each unit spawns and held until the unit finishes, so at
        // most `concurrency` units hold an outstanding provider call.
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let extractor = self.extractor.clone();
        let images = self.images.clone();
        let type_resolver = self.type_resolver.clone();
        let consumer_probe = event_tx.clone();
        tokio::spawn(async move {
            for group in groups {
                if consumer_probe.is_closed() {
                    debug!("Consumer abandoned stream; halting admission");
                    break;
                }
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let extractor = extractor.clone();
                let images = images.clone();
                let type_resolver = type_resolver.clone();
                let tx = unit_tx.clone();
                tokio::spawn(async move {
                    let result =
                        run_unit(&*extractor, &*images, &*type_resolver, &group).await;
                    drop(permit);
                    let _ = tx.send(result).await;
                });
            }
        });

        // Streaming: the progress counter lives here and nowhere else; work
        // units only report completion through the channel.
        let progress = BatchProgress::new(total);
        let store = self.store.clone();
        let stream_batch_id = batch_id.clone();
        tokio::spawn(async move {
            let mut results = Vec::with_capacity(total as usize);
            while let Some(result) = unit_rx.recv().await {
                let completed = progress.record_completion();
                info!(
                    batch_id = %stream_batch_id,
                    label_id = %result.label_id,
                    status = %result.overall_status,
                    completed,
                    total,
                    "Batch label completed"
                );
                results.push(result.clone());
                let event = BatchEvent {
                    batch_id: stream_batch_id.clone(),
                    completed,
                    total,
                    result,
                };
                if event_tx.send(event).await.is_err() {
                    debug!(batch_id = %stream_batch_id, "Consumer gone; draining remaining units");
                }
                if progress.is_terminal() {
                    break;
                }
            }

            if progress.is_terminal() {
                store.insert(BatchSnapshot {
                    batch_id: stream_batch_id.clone(),
                    total,
                    completed: progress.completed(),
                    results,
                });
                info!(batch_id = %stream_batch_id, total, "Batch finished");
            }
        });

        Ok(BatchHandle {
            batch_id,
            total,
            events: event_rx,
        })
    }
}

/// One label group's work unit: intake, extraction, verdict. Infallible by
/// construction; every failure becomes an `ERROR` result so no group can
/// abort the scheduler or delay its peers.
async fn run_unit<E: FieldExtractor, S: ImageStore>(
    extractor: &E,
    images: &S,
    type_resolver: &dyn BeverageTypeResolver,
    group: &LabelGroup,
) -> LabelResult {
    info!(
        label_id = %group.label_id,
        label_name = %group.label_name,
        beverage_type = ?group.beverage_type,
        image_count = group.images.len(),
        "Label verification started"
    );

    let mut resolved: Vec<ImageBytes> = Vec::with_capacity(group.images.len());
    for reference in &group.images {
        match images.resolve(reference).await {
            Ok(image) => resolved.push(image),
            Err(e) => {
                error!(label_id = %group.label_id, error = %e, "Image intake failed");
                return LabelResult::processing_error(group, e.to_string());
            }
        }
    }

    let mut machine = ExtractionMachine::new(extractor);
    let outcome = match machine.run(&resolved, group.beverage_type).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(label_id = %group.label_id, error = %e, "Extraction failed");
            return LabelResult::processing_error(group, format!("extraction failed: {e}"));
        }
    };

    match resolve(group, &outcome, type_resolver) {
        Ok(result) => {
            info!(
                label_id = %group.label_id,
                status = %result.overall_status,
                "Label verification finished"
            );
            result
        }
        Err(e) => {
            error!(label_id = %group.label_id, error = %e, "Verdict resolution failed");
            LabelResult::processing_error(group, e.to_string())
        }
    }
}
