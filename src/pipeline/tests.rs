use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::extraction::mock::{MockExtractor, complete_field_map};
use crate::extraction::ProviderError;
use crate::intake::MockImageStore;
use crate::label::{BeverageType, BeverageTypeRequest, ImageReference, OverallStatus};

fn make_group(store: &MockImageStore, id: &str) -> LabelGroup {
    let storage_key = format!("{id}.jpg");
    store.insert(&storage_key, format!("image-bytes-{id}").into_bytes());
    LabelGroup {
        label_id: id.to_string(),
        label_name: format!("Label {id}"),
        beverage_type: BeverageTypeRequest::Spirits,
        images: vec![ImageReference {
            storage_key,
            filename: format!("{id}.jpg"),
        }],
    }
}

fn make_pipeline(
    extractor: Arc<MockExtractor>,
    store: Arc<MockImageStore>,
    concurrency: usize,
) -> VerifyPipeline<MockExtractor, MockImageStore> {
    VerifyPipeline::new(extractor, store, concurrency, DEFAULT_MAX_BATCH_SIZE)
}

async fn collect_events(mut handle: BatchHandle) -> Vec<crate::label::BatchEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn emits_exactly_n_events_with_monotonic_progress() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let groups: Vec<LabelGroup> = (0..5).map(|i| make_group(&images, &format!("g{i}"))).collect();

    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);
    let handle = pipeline.submit(groups).expect("submit");
    let total = handle.total;
    let events = collect_events(handle).await;

    assert_eq!(events.len(), 5);
    assert_eq!(total, 5);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.completed, (i + 1) as u32);
        assert_eq!(event.total, 5);
    }
    assert_eq!(events.last().unwrap().completed, 5);

    let ids: HashSet<String> = events.iter().map(|e| e.result.label_id.clone()).collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn provider_failure_is_isolated_to_its_group() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    extractor.respond_when(
        b"image-bytes-bad",
        Err(ProviderError::Transport("connection reset".to_string())),
    );

    let groups = vec![
        make_group(&images, "good-1"),
        make_group(&images, "bad"),
        make_group(&images, "good-2"),
    ];

    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);
    let events = collect_events(pipeline.submit(groups).expect("submit")).await;

    assert_eq!(events.len(), 3);
    for event in &events {
        let expected = if event.result.label_id == "bad" {
            OverallStatus::Error
        } else {
            OverallStatus::Pass
        };
        assert_eq!(event.result.overall_status, expected, "{}", event.result.label_id);
    }
}

#[tokio::test]
async fn concurrency_ceiling_bounds_outstanding_provider_calls() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::with_delay(Duration::from_millis(30)));
    let groups: Vec<LabelGroup> =
        (0..12).map(|i| make_group(&images, &format!("c{i}"))).collect();

    let pipeline = make_pipeline(extractor.clone(), images, 3);
    let events = collect_events(pipeline.submit(groups).expect("submit")).await;

    assert_eq!(events.len(), 12);
    assert!(
        extractor.max_in_flight() <= 3,
        "observed {} concurrent calls",
        extractor.max_in_flight()
    );
    assert!(extractor.max_in_flight() >= 2);
}

#[tokio::test]
async fn completion_order_follows_latency_not_submission_order() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    extractor.respond_when_delayed(
        b"image-bytes-slow",
        Duration::from_millis(150),
        Ok(complete_field_map(BeverageType::Spirits)),
    );

    // Slow label submitted first, but its event arrives last.
    let groups = vec![
        make_group(&images, "slow"),
        make_group(&images, "fast-1"),
        make_group(&images, "fast-2"),
    ];

    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);
    let events = collect_events(pipeline.submit(groups).expect("submit")).await;

    assert_eq!(events.len(), 3);
    assert_eq!(events.last().unwrap().result.label_id, "slow");
    assert_eq!(events.last().unwrap().completed, 3);
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_work() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let groups: Vec<LabelGroup> =
        (0..5).map(|i| make_group(&images, &format!("o{i}"))).collect();

    let pipeline = VerifyPipeline::new(extractor.clone(), images, DEFAULT_CONCURRENCY, 4);
    let err = pipeline.submit(groups).unwrap_err();

    assert!(matches!(
        err,
        SubmitError::BatchSizeExceeded { submitted: 5, limit: 4 }
    ));
    assert_eq!(extractor.call_count(), 0);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);

    assert!(matches!(
        pipeline.submit(Vec::new()).unwrap_err(),
        SubmitError::EmptyBatch
    ));
}

#[tokio::test]
async fn group_without_images_is_rejected() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);

    let group = LabelGroup {
        label_id: "empty".to_string(),
        label_name: "Empty".to_string(),
        beverage_type: BeverageTypeRequest::Beer,
        images: Vec::new(),
    };

    assert!(matches!(
        pipeline.submit(vec![group]).unwrap_err(),
        SubmitError::ImageCountOutOfRange { count: 0, .. }
    ));
}

#[tokio::test]
async fn missing_image_becomes_error_result() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let group = LabelGroup {
        label_id: "no-image".to_string(),
        label_name: "No Image".to_string(),
        beverage_type: BeverageTypeRequest::Spirits,
        images: vec![ImageReference {
            storage_key: "never-stored.jpg".to_string(),
            filename: "never-stored.jpg".to_string(),
        }],
    };

    let pipeline = make_pipeline(extractor.clone(), images, DEFAULT_CONCURRENCY);
    let events = collect_events(pipeline.submit(vec![group]).expect("submit")).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].result.overall_status, OverallStatus::Error);
    // Extraction never ran for a group whose intake failed.
    assert_eq!(extractor.call_count(), 0);
}

#[tokio::test]
async fn snapshot_is_published_only_after_termination() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let groups: Vec<LabelGroup> =
        (0..3).map(|i| make_group(&images, &format!("s{i}"))).collect();

    let pipeline = make_pipeline(extractor, images, DEFAULT_CONCURRENCY);
    assert!(pipeline.store().snapshot("not-a-batch").is_none());

    let handle = pipeline.submit(groups).expect("submit");
    let batch_id = handle.batch_id.clone();
    let events = collect_events(handle).await;
    assert_eq!(events.len(), 3);

    let snapshot = pipeline
        .store()
        .snapshot(&batch_id)
        .expect("terminal snapshot");
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.completed, 3);
    assert_eq!(snapshot.results.len(), 3);
}
