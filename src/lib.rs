//! Labelcheck library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`LabelGroup`], [`LabelResult`], [`BatchEvent`], [`BatchSnapshot`] - Data model
//! - [`VerifyPipeline`], [`BatchHandle`] - Batch verification pipeline
//!
//! ## Rules & Verdicts
//! - [`rule_table`], [`verify_warning`], [`CANONICAL_WARNING`] - Field rule set
//! - [`resolve`], [`KeywordResolver`] - Validation and escalation resolution
//!
//! ## Extraction
//! - [`FieldExtractor`], [`GenaiExtractor`] - Provider adapter
//! - [`ExtractionMachine`], [`ExtractionOutcome`] - Two-pass state machine
//!
//! ## Collaborators
//! - [`ImageStore`], [`FsImageStore`] - Image intake
//! - [`create_router_with_state`], [`HandlerState`] - HTTP gateway
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod extraction;
pub mod gateway;
pub mod intake;
pub mod label;
pub mod pipeline;
pub mod rules;
pub mod verdict;

pub use config::{Config, ConfigError};
pub use extraction::{
    ExtractedValue, ExtractionMachine, ExtractionOutcome, ExtractionPass, FieldExtractor,
    FieldMap, GenaiExtractor, MachineState, PromptVariant, ProviderError,
};
#[cfg(any(test, feature = "mock"))]
pub use extraction::{MockExtractor, RecordedCall, complete_field_map};

pub use gateway::{
    BatchVerifyRequest, HandlerState, LABELCHECK_STATUS_HEADER, create_router_with_state,
};
pub use intake::{FsImageStore, ImageBytes, ImageStore, IntakeError};
#[cfg(any(test, feature = "mock"))]
pub use intake::MockImageStore;

pub use label::{
    BatchEvent, BatchSnapshot, BeverageType, BeverageTypeRequest, FieldResult, FieldStatus,
    ImageReference, LabelField, LabelGroup, LabelResult, MAX_IMAGES_PER_GROUP, OverallStatus,
};
pub use pipeline::{
    BatchHandle, BatchProgress, BatchStore, DEFAULT_CONCURRENCY, DEFAULT_MAX_BATCH_SIZE,
    SubmitError, VerifyPipeline,
};
pub use rules::{
    CANONICAL_WARNING, Condition, DesignationMatch, ExtractedView, FieldRule, WarningVerdict,
    classify_alcohol_content, classify_designation, required_fields, rule_table, verify_warning,
};
pub use verdict::{BeverageTypeResolver, KeywordResolver, ValidationRuleError, resolve};
