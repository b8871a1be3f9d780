//! End-to-end batch pipeline tests over the public crate API.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use labelcheck::{
    BatchEvent, BeverageType, BeverageTypeRequest, FieldStatus, ImageReference, LabelField,
    LabelGroup, MockExtractor, MockImageStore, OverallStatus, ProviderError, VerifyPipeline,
    complete_field_map,
};

fn make_group(store: &MockImageStore, id: &str, beverage: BeverageTypeRequest) -> LabelGroup {
    let storage_key = format!("{id}.jpg");
    store.insert(&storage_key, format!("image-bytes-{id}").into_bytes());
    LabelGroup {
        label_id: id.to_string(),
        label_name: format!("Label {id}"),
        beverage_type: beverage,
        images: vec![ImageReference {
            storage_key,
            filename: format!("{id}.jpg"),
        }],
    }
}

async fn collect(mut handle: labelcheck::BatchHandle) -> Vec<BatchEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn stream_emits_one_terminal_event_per_label() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let groups: Vec<LabelGroup> = (0..10)
        .map(|i| make_group(&images, &format!("g{i}"), BeverageTypeRequest::Spirits))
        .collect();

    let pipeline = VerifyPipeline::new(extractor, images, 10, 100);
    let events = collect(pipeline.submit(groups).expect("submit")).await;

    assert_eq!(events.len(), 10);
    let completed: Vec<u32> = events.iter().map(|e| e.completed).collect();
    assert_eq!(completed, (1..=10).collect::<Vec<u32>>());
    assert_eq!(events.last().unwrap().total, 10);

    let ids: HashSet<&str> = events.iter().map(|e| e.result.label_id.as_str()).collect();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn mixed_batch_resolves_each_label_independently() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());

    // Wine label whose warning text lost clause (2): hard FAIL.
    let mut wine = complete_field_map(BeverageType::Wine);
    let canonical = labelcheck::CANONICAL_WARNING;
    let truncated = &canonical[..canonical.find("(2)").expect("clause (2)")];
    wine.insert(LabelField::GovernmentWarning, truncated.to_string(), Some(1));
    extractor.respond_when(b"image-bytes-wine", Ok(wine));

    // Spirits label stating alcohol as "40% ABV": field-level escalate.
    let mut spirits = complete_field_map(BeverageType::Spirits);
    spirits.insert(LabelField::AlcoholContent, "40% ABV".to_string(), Some(1));
    extractor.respond_when(b"image-bytes-abv", Ok(spirits));

    // Provider failure for one label only.
    extractor.respond_when(
        b"image-bytes-broken",
        Err(ProviderError::Timeout(Duration::from_secs(60))),
    );

    let groups = vec![
        make_group(&images, "wine", BeverageTypeRequest::Wine),
        make_group(&images, "abv", BeverageTypeRequest::Spirits),
        make_group(&images, "broken", BeverageTypeRequest::Beer),
        make_group(&images, "clean", BeverageTypeRequest::Spirits),
    ];

    let pipeline = VerifyPipeline::new(extractor, images, 10, 100);
    let events = collect(pipeline.submit(groups).expect("submit")).await;
    assert_eq!(events.len(), 4);

    let by_id = |id: &str| {
        events
            .iter()
            .find(|e| e.result.label_id == id)
            .unwrap_or_else(|| panic!("no event for {id}"))
    };

    assert_eq!(by_id("wine").result.overall_status, OverallStatus::Fail);
    assert_eq!(by_id("abv").result.overall_status, OverallStatus::Escalate);
    assert_eq!(by_id("broken").result.overall_status, OverallStatus::Error);
    assert_eq!(by_id("clean").result.overall_status, OverallStatus::Pass);

    let abv_field = by_id("abv")
        .result
        .fields
        .iter()
        .find(|f| f.field_name == LabelField::AlcoholContent.as_str())
        .expect("alcohol field");
    assert_eq!(abv_field.status, FieldStatus::Escalate);
}

#[tokio::test]
async fn abandoned_stream_stops_admitting_new_units() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::with_delay(Duration::from_millis(50)));
    let groups: Vec<LabelGroup> = (0..30)
        .map(|i| make_group(&images, &format!("a{i}"), BeverageTypeRequest::Spirits))
        .collect();

    let pipeline = VerifyPipeline::new(extractor.clone(), images, 2, 100);
    let handle = pipeline.submit(groups).expect("submit");
    drop(handle);

    // In-flight units drain; the rest are never admitted.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(
        extractor.call_count() < 30,
        "admission should halt after abandonment, saw {} calls",
        extractor.call_count()
    );
}

#[tokio::test]
async fn terminal_snapshot_matches_streamed_results() {
    let images = Arc::new(MockImageStore::new());
    let extractor = Arc::new(MockExtractor::new());
    let groups: Vec<LabelGroup> = (0..4)
        .map(|i| make_group(&images, &format!("s{i}"), BeverageTypeRequest::Spirits))
        .collect();

    let pipeline = VerifyPipeline::new(extractor, images, 10, 100);
    let handle = pipeline.submit(groups).expect("submit");
    let batch_id = handle.batch_id.clone();
    let events = collect(handle).await;

    let snapshot = pipeline.store().snapshot(&batch_id).expect("snapshot");
    assert_eq!(snapshot.completed, 4);
    assert_eq!(snapshot.total, 4);

    let streamed: HashSet<String> = events.iter().map(|e| e.result.label_id.clone()).collect();
    let stored: HashSet<String> = snapshot
        .results
        .iter()
        .map(|r| r.label_id.clone())
        .collect();
    assert_eq!(streamed, stored);
}
