//! Field extraction from label images.
//!
//! The extraction provider is an external vision model reached through the
//! narrow [`FieldExtractor`] adapter; the two-pass retry policy lives entirely
//! in [`machine`]. No confidence scores anywhere: the only branch condition is
//! value present vs absent.

pub mod error;
pub mod machine;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;


pub use error::ProviderError;
pub use machine::{ExtractionMachine, ExtractionOutcome, ExtractionPass, MachineState};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockExtractor, RecordedCall, complete_field_map};
pub use provider::GenaiExtractor;

use std::collections::{BTreeMap, BTreeSet};

use crate::intake::ImageBytes;
use crate::label::LabelField;
use crate::rules::ExtractedView;

/// Prompt selection for one extraction attempt. The second pass uses a prompt
/// specialized for noisy, low-contrast label photography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    Standard,
    DegradedImageSpecialized,
}

/// One extracted field value with its source image (1-based), when the
/// provider could attribute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedValue {
    pub text: String,
    pub image_index: Option<u8>,
}

/// Field values returned by one or more extraction passes.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    values: BTreeMap<LabelField, ExtractedValue>,
    unreadable: BTreeSet<LabelField>,
    detected_type: Option<String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value; empty or whitespace-only text is treated as absent.
    pub fn insert(&mut self, field: LabelField, text: String, image_index: Option<u8>) {
        if text.trim().is_empty() {
            return;
        }
        self.unreadable.remove(&field);
        self.values.insert(field, ExtractedValue { text, image_index });
    }

    /// Marks a field the provider saw but could not read. A later inserted
    /// value clears the mark.
    pub fn mark_unreadable(&mut self, field: LabelField) {
        if !self.values.contains_key(&field) {
            self.unreadable.insert(field);
        }
    }

    pub fn set_detected_type(&mut self, detected: Option<String>) {
        self.detected_type = detected.filter(|t| !t.trim().is_empty());
    }

    /// The provider's own beverage-type guess, if it offered one.
    pub fn detected_type(&self) -> Option<&str> {
        self.detected_type.as_deref()
    }

    pub fn get(&self, field: LabelField) -> Option<&ExtractedValue> {
        self.values.get(&field)
    }

    pub fn image_index(&self, field: LabelField) -> Option<u8> {
        self.values.get(&field).and_then(|v| v.image_index)
    }

    pub fn is_unreadable(&self, field: LabelField) -> bool {
        self.unreadable.contains(&field)
    }

    pub fn present_fields(&self) -> Vec<LabelField> {
        self.values.keys().copied().collect()
    }

    /// Overlays a later pass onto this map: new values win, and fields now
    /// present drop out of the unreadable set.
    pub fn merge_from(&mut self, later: FieldMap) {
        for (field, value) in later.values {
            self.unreadable.remove(&field);
            self.values.insert(field, value);
        }
        for field in later.unreadable {
            if !self.values.contains_key(&field) {
                self.unreadable.insert(field);
            }
        }
        if later.detected_type.is_some() {
            self.detected_type = later.detected_type;
        }
    }
}

impl ExtractedView for FieldMap {
    fn value_of(&self, field: LabelField) -> Option<&str> {
        self.values.get(&field).map(|v| v.text.as_str())
    }
}

/// Narrow interface to the external extraction provider.
///
/// Stateless; makes no retry decisions. Provider failures propagate as
/// [`ProviderError`], never as an empty field map.
pub trait FieldExtractor: Send + Sync {
    fn extract(
        &self,
        images: &[ImageBytes],
        variant: PromptVariant,
        wanted: &[LabelField],
    ) -> impl std::future::Future<Output = Result<FieldMap, ProviderError>> + Send;
}
