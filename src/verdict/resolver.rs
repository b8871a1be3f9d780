use tracing::{debug, info};

use crate::extraction::{ExtractionOutcome, FieldMap};
use crate::label::{
    BeverageType, FieldResult, FieldStatus, LabelField, LabelGroup, LabelResult, OverallStatus,
};
use crate::rules::{
    DesignationMatch, ExtractedView, classify_alcohol_content, classify_designation, rule_table,
    verify_warning, WarningVerdict,
};

use super::error::ValidationRuleError;

/// Strategy for inferring a beverage type from extracted data when the caller
/// requested `auto`. The inference heuristic is deliberately pluggable; the
/// interface is fixed.
pub trait BeverageTypeResolver: Send + Sync {
    fn infer(&self, extracted: &FieldMap) -> Option<BeverageType>;
}

const SPIRITS_TOKENS: &[&str] = &[
    "whiskey", "whisky", "bourbon", "gin", "rum", "vodka", "tequila", "brandy",
];
const BEER_TOKENS: &[&str] = &["beer", "ale", "lager", "stout", "porter", "pilsner", "ipa"];
const WINE_TOKENS: &[&str] = &[
    "wine",
    "cabernet",
    "merlot",
    "pinot",
    "chardonnay",
    "sauvignon",
    "sparkling",
];

/// Default inference: the provider's own type guess when it names a known
/// type, otherwise keyword matching over the class/type designation.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResolver;

impl BeverageTypeResolver for KeywordResolver {
    fn infer(&self, extracted: &FieldMap) -> Option<BeverageType> {
        if let Some(detected) = extracted.detected_type().and_then(BeverageType::parse) {
            return Some(detected);
        }

        let class_type = extracted.value_of(LabelField::ClassType)?.to_ascii_lowercase();
        if SPIRITS_TOKENS.iter().any(|t| class_type.contains(t)) {
            return Some(BeverageType::Spirits);
        }
        if BEER_TOKENS.iter().any(|t| class_type.contains(t)) {
            return Some(BeverageType::Beer);
        }
        if WINE_TOKENS.iter().any(|t| class_type.contains(t)) {
            return Some(BeverageType::Wine);
        }
        None
    }
}

/// Resolves one extraction outcome into the final label verdict.
///
/// Output status is a pure function of the resolved beverage type and the
/// evaluated field set; identical inputs always produce identical verdicts.
pub fn resolve(
    group: &LabelGroup,
    outcome: &ExtractionOutcome,
    strategy: &dyn BeverageTypeResolver,
) -> Result<LabelResult, ValidationRuleError> {
    let (beverage, type_ambiguous) = match group.beverage_type.declared() {
        Some(declared) => (declared, false),
        None => match strategy.infer(&outcome.fields) {
            Some(inferred) => {
                info!(
                    label_id = %group.label_id,
                    beverage = %inferred,
                    "Auto beverage type resolved"
                );
                (inferred, false)
            }
            // Evaluation still runs, against the spirits table, so the result
            // carries field detail alongside the label-level escalation.
            None => (BeverageType::Spirits, true),
        },
    };

    let table = rule_table(beverage);
    if table.is_empty() {
        return Err(ValidationRuleError::MissingRuleTable { beverage });
    }

    let mut fields = Vec::new();
    for rule in table {
        if !rule.condition.applies(&outcome.fields) {
            continue;
        }
        fields.push(evaluate_field(rule.field, rule.citation, beverage, outcome));
    }

    debug!(
        label_id = %group.label_id,
        field_count = fields.len(),
        fail_count = fields.iter().filter(|f| f.status == FieldStatus::Fail).count(),
        unreadable_count = fields.iter().filter(|f| f.status == FieldStatus::Unreadable).count(),
        "Field validation complete"
    );

    let (overall, escalation_reason) = derive_overall(&fields, type_ambiguous);

    Ok(LabelResult {
        label_id: group.label_id.clone(),
        label_name: group.label_name.clone(),
        overall_status: overall,
        beverage_type: beverage,
        fields,
        escalation_reason,
        images_processed: group.images.len(),
    })
}

fn evaluate_field(
    field: LabelField,
    citation: &'static str,
    beverage: BeverageType,
    outcome: &ExtractionOutcome,
) -> FieldResult {
    let Some(value) = outcome.fields.value_of(field) else {
        if outcome.missing.contains(&field) || outcome.fields.is_unreadable(field) {
            return FieldResult::unreadable(
                field,
                format!(
                    "{} not found on any image after retry",
                    field.display_name()
                ),
                citation,
            );
        }
        return FieldResult::fail(
            field,
            format!(
                "{} missing; required for {}",
                field.display_name(),
                beverage
            ),
            citation,
            None,
        );
    };

    let value = value.to_string();
    let image = outcome.fields.image_index(field);

    match field {
        LabelField::GovernmentWarning => match verify_warning(Some(&value)) {
            WarningVerdict::Exact => FieldResult::pass(field, Some(value), image),
            WarningVerdict::Mismatch { reason } => {
                FieldResult::fail(field, reason, citation, Some(value))
            }
        },
        LabelField::AlcoholContent => match classify_alcohol_content(&value) {
            Some(note) => {
                FieldResult::escalate(field, note.to_string(), citation, Some(value), image)
            }
            None => FieldResult::pass(field, Some(value), image),
        },
        LabelField::ClassType => match classify_designation(beverage, &value) {
            DesignationMatch::Known => FieldResult::pass(field, Some(value), image),
            DesignationMatch::Unrecognized => FieldResult::escalate(
                field,
                format!(
                    "'{}' is not a recognized {} designation; possible synonym requires review",
                    value, beverage
                ),
                citation,
                Some(value),
                image,
            ),
        },
        _ => FieldResult::pass(field, Some(value), image),
    }
}

/// Label status priority: any fail wins, then any unreadable or
/// escalate-classified field (or an ambiguous beverage type) escalates,
/// otherwise pass. ERROR is assigned upstream at the work-unit boundary.
fn derive_overall(
    fields: &[FieldResult],
    type_ambiguous: bool,
) -> (OverallStatus, Option<String>) {
    if fields.iter().any(|f| f.status == FieldStatus::Fail) {
        return (OverallStatus::Fail, None);
    }

    let mut drivers: Vec<String> = Vec::new();
    if type_ambiguous {
        drivers.push("beverage type could not be determined".to_string());
    }
    for field in fields {
        let name = LabelField::parse(&field.field_name)
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|| field.field_name.clone());
        match field.status {
            FieldStatus::Unreadable => drivers.push(format!("{name} unreadable after retry")),
            FieldStatus::Escalate => drivers.push(format!("{name} requires review")),
            _ => {}
        }
    }

    if drivers.is_empty() {
        (OverallStatus::Pass, None)
    } else {
        (
            OverallStatus::Escalate,
            Some(format!("Human review required: {}", drivers.join("; "))),
        )
    }
}
