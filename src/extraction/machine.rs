//! Two-pass extraction state machine.
//!
//! `NotStarted -> PassOne -> {Complete | PassTwo} -> {Complete | Residual}`,
//! with `Failed` terminal on provider error at either pass. Retry is reserved
//! for extractable-but-unreadable fields; a [`ProviderError`] is never retried
//! here and yields a terminal error distinct from a residual outcome.

use tracing::{debug, info};

use crate::intake::ImageBytes;
use crate::label::{BeverageType, BeverageTypeRequest, LabelField};
use crate::rules::required_fields;

use super::error::ProviderError;
use super::{FieldExtractor, FieldMap, PromptVariant};

/// Observable machine state, for tests asserting the path taken rather than
/// just the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    NotStarted,
    PassOne,
    PassTwo,
    Complete,
    Residual,
    Failed,
}

/// Immutable record of one extraction attempt.
#[derive(Debug, Clone)]
pub struct ExtractionPass {
    /// 1 or 2.
    pub number: u8,
    /// Fields the provider returned values for in this pass.
    pub returned: Vec<LabelField>,
    /// Required fields still missing after this pass.
    pub missing: Vec<LabelField>,
}

/// Terminal result of the machine for one label group: a field map that is
/// either complete or carries a residual missing-field set after both passes.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub fields: FieldMap,
    pub missing: Vec<LabelField>,
    pub passes: Vec<ExtractionPass>,
}

impl ExtractionOutcome {
    /// True when every required field was present in some pass.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Drives one label group through extraction with a deterministic
/// retry-then-residual policy. No confidence thresholds: the only branch
/// condition is value present vs absent after each pass.
pub struct ExtractionMachine<'a, E: FieldExtractor> {
    extractor: &'a E,
    state: MachineState,
}

impl<'a, E: FieldExtractor> ExtractionMachine<'a, E> {
    pub fn new(extractor: &'a E) -> Self {
        Self {
            extractor,
            state: MachineState::NotStarted,
        }
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Runs both passes as needed and yields the terminal outcome.
    pub async fn run(
        &mut self,
        images: &[ImageBytes],
        requested: BeverageTypeRequest,
    ) -> Result<ExtractionOutcome, ProviderError> {
        self.state = MachineState::PassOne;
        let fields = match self
            .extractor
            .extract(images, PromptVariant::Standard, &LabelField::ALL)
            .await
        {
            Ok(fields) => fields,
            Err(e) => {
                self.state = MachineState::Failed;
                return Err(e);
            }
        };

        let mut merged = fields;
        let missing = missing_required(requested, &merged);
        let mut passes = vec![ExtractionPass {
            number: 1,
            returned: merged.present_fields(),
            missing: missing.clone(),
        }];
        debug!(missing = ?missing, "Extraction pass 1 complete");

        if missing.is_empty() {
            self.state = MachineState::Complete;
            return Ok(ExtractionOutcome {
                fields: merged,
                missing,
                passes,
            });
        }

        self.state = MachineState::PassTwo;
        let retry = match self
            .extractor
            .extract(images, PromptVariant::DegradedImageSpecialized, &missing)
            .await
        {
            Ok(fields) => fields,
            Err(e) => {
                self.state = MachineState::Failed;
                return Err(e);
            }
        };

        let returned = retry.present_fields();
        merged.merge_from(retry);
        let missing = missing_required(requested, &merged);
        passes.push(ExtractionPass {
            number: 2,
            returned,
            missing: missing.clone(),
        });
        info!(missing = ?missing, "Extraction retry complete");

        self.state = if missing.is_empty() {
            MachineState::Complete
        } else {
            MachineState::Residual
        };
        Ok(ExtractionOutcome {
            fields: merged,
            missing,
            passes,
        })
    }
}

/// Required fields still absent from the map, for the group's
/// declared-or-eventual beverage type. With `Auto` and no usable detected
/// type yet, the spirits table stands in as the universal field set.
fn missing_required(requested: BeverageTypeRequest, fields: &FieldMap) -> Vec<LabelField> {
    let eventual = requested
        .declared()
        .or_else(|| fields.detected_type().and_then(BeverageType::parse))
        .unwrap_or(BeverageType::Spirits);

    required_fields(eventual, fields)
        .iter()
        .filter(|r| fields.get(r.field).is_none())
        .map(|r| r.field)
        .collect()
}
