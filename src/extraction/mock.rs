//! Scripted mock extractor for machine, pipeline, and gateway tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::intake::ImageBytes;
use crate::label::{BeverageType, LabelField};
use crate::rules::CANONICAL_WARNING;

use super::error::ProviderError;
use super::{FieldExtractor, FieldMap, PromptVariant};

/// A fully compliant field map for the given beverage type, using the
/// canonical warning text.
pub fn complete_field_map(beverage: BeverageType) -> FieldMap {
    let (brand, class_type, alcohol, net, address) = match beverage {
        BeverageType::Spirits => (
            "Old Creek Reserve",
            "Kentucky Straight Bourbon Whiskey",
            "45% Alc./Vol.",
            "750 mL",
            "Old Creek Distilling Co., Louisville, KY",
        ),
        BeverageType::Beer => (
            "Harbor Line",
            "India Pale Ale",
            "6.2% Alc./Vol.",
            "12 FL. OZ.",
            "Harbor Line Brewing Co., Portland, OR",
        ),
        BeverageType::Wine => (
            "Silver Hollow",
            "Cabernet Sauvignon",
            "13.5% Alc./Vol.",
            "750 mL",
            "Silver Hollow Winery, Napa, CA",
        ),
    };

    let mut map = FieldMap::new();
    map.insert(LabelField::BrandName, brand.to_string(), Some(1));
    map.insert(LabelField::ClassType, class_type.to_string(), Some(1));
    map.insert(LabelField::AlcoholContent, alcohol.to_string(), Some(1));
    map.insert(LabelField::NetContents, net.to_string(), Some(1));
    map.insert(LabelField::NameAddress, address.to_string(), Some(2));
    map.insert(
        LabelField::GovernmentWarning,
        CANONICAL_WARNING.to_string(),
        Some(2),
    );
    map.set_detected_type(Some(beverage.as_str().to_string()));
    map
}

/// One recorded [`FieldExtractor::extract`] call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub variant: PromptVariant,
    pub wanted: Vec<LabelField>,
}

struct MarkerRule {
    marker: Vec<u8>,
    delay: Option<Duration>,
    response: Result<FieldMap, ProviderError>,
}

/// Mock extractor.
///
/// Responses come from, in order of precedence: a scripted FIFO queue, a
/// byte-marker match against the submitted images (for concurrent batches
/// where call order is not deterministic), or a complete spirits payload.
#[derive(Default)]
pub struct MockExtractor {
    script: Mutex<VecDeque<Result<FieldMap, ProviderError>>>,
    markers: Mutex<Vec<MarkerRule>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds per-call latency, letting tests observe concurrent admission.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queues the response for the next unmatched call.
    pub fn push_response(&self, response: Result<FieldMap, ProviderError>) {
        self.script.lock().expect("lock poisoned").push_back(response);
    }

    /// Registers a response for any call whose image bytes contain `marker`.
    pub fn respond_when(&self, marker: &[u8], response: Result<FieldMap, ProviderError>) {
        self.markers.lock().expect("lock poisoned").push(MarkerRule {
            marker: marker.to_vec(),
            delay: None,
            response,
        });
    }

    /// Like [`respond_when`](Self::respond_when), with extra latency for the
    /// matched call only.
    pub fn respond_when_delayed(
        &self,
        marker: &[u8],
        delay: Duration,
        response: Result<FieldMap, ProviderError>,
    ) {
        self.markers.lock().expect("lock poisoned").push(MarkerRule {
            marker: marker.to_vec(),
            delay: Some(delay),
            response,
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    /// High-water mark of concurrent outstanding calls.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(
        &self,
        images: &[ImageBytes],
    ) -> (Option<Duration>, Result<FieldMap, ProviderError>) {
        if let Some(scripted) = self.script.lock().expect("lock poisoned").pop_front() {
            return (None, scripted);
        }
        let markers = self.markers.lock().expect("lock poisoned");
        for rule in markers.iter() {
            if images.iter().any(|img| {
                img.bytes
                    .windows(rule.marker.len())
                    .any(|w| w == rule.marker.as_slice())
            }) {
                return (rule.delay, rule.response.clone());
            }
        }
        (None, Ok(complete_field_map(BeverageType::Spirits)))
    }
}

impl FieldExtractor for MockExtractor {
    async fn extract(
        &self,
        images: &[ImageBytes],
        variant: PromptVariant,
        wanted: &[LabelField],
    ) -> Result<FieldMap, ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.lock().expect("lock poisoned").push(RecordedCall {
            variant,
            wanted: wanted.to_vec(),
        });
        let (extra_delay, response) = self.next_response(images);
        if let Some(delay) = extra_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}
