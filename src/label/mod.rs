//! Core data model for label groups, field verdicts, and batch results.

use serde::{Deserialize, Serialize};

/// Beverage categories with distinct mandatory-field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeverageType {
    Spirits,
    Beer,
    Wine,
}

impl BeverageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeverageType::Spirits => "spirits",
            BeverageType::Beer => "beer",
            BeverageType::Wine => "wine",
        }
    }

    /// Parses a provider-reported type name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spirits" => Some(BeverageType::Spirits),
            "beer" => Some(BeverageType::Beer),
            "wine" => Some(BeverageType::Wine),
            _ => None,
        }
    }
}

impl std::fmt::Display for BeverageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Beverage type as requested by the caller. `Auto` is resolved during
/// verification and never appears in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeverageTypeRequest {
    Auto,
    Spirits,
    Beer,
    Wine,
}

impl BeverageTypeRequest {
    /// The declared type, or `None` for `Auto`.
    pub fn declared(&self) -> Option<BeverageType> {
        match self {
            BeverageTypeRequest::Auto => None,
            BeverageTypeRequest::Spirits => Some(BeverageType::Spirits),
            BeverageTypeRequest::Beer => Some(BeverageType::Beer),
            BeverageTypeRequest::Wine => Some(BeverageType::Wine),
        }
    }
}

/// Opaque handle to one label image, resolvable by the intake collaborator.
///
/// Position within its [`LabelGroup`] gives the 1-based index reported as
/// `found_on_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReference {
    pub storage_key: String,
    pub filename: String,
}

/// 1-3 images treated as one product for verification purposes.
///
/// Immutable once submitted; the image-count invariant is enforced at
/// submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelGroup {
    pub label_id: String,
    pub label_name: String,
    pub beverage_type: BeverageTypeRequest,
    pub images: Vec<ImageReference>,
}

/// Maximum images per label group.
pub const MAX_IMAGES_PER_GROUP: usize = 3;

/// Data points the rule set can mandate for a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelField {
    BrandName,
    ClassType,
    AlcoholContent,
    NetContents,
    NameAddress,
    GovernmentWarning,
    CountryOfOrigin,
    SulfiteDeclaration,
}

impl LabelField {
    /// Every field the extraction provider is asked about.
    pub const ALL: [LabelField; 8] = [
        LabelField::BrandName,
        LabelField::ClassType,
        LabelField::AlcoholContent,
        LabelField::NetContents,
        LabelField::NameAddress,
        LabelField::GovernmentWarning,
        LabelField::CountryOfOrigin,
        LabelField::SulfiteDeclaration,
    ];

    /// Parses a wire name back into a field; unknown names are ignored by
    /// callers rather than treated as errors.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelField::BrandName => "brand_name",
            LabelField::ClassType => "class_type",
            LabelField::AlcoholContent => "alcohol_content",
            LabelField::NetContents => "net_contents",
            LabelField::NameAddress => "name_address",
            LabelField::GovernmentWarning => "government_warning",
            LabelField::CountryOfOrigin => "country_of_origin",
            LabelField::SulfiteDeclaration => "sulfite_declaration",
        }
    }

    /// Human-facing name used in escalation reasons.
    pub fn display_name(&self) -> &'static str {
        match self {
            LabelField::BrandName => "Brand Name",
            LabelField::ClassType => "Class/Type Designation",
            LabelField::AlcoholContent => "Alcohol Content",
            LabelField::NetContents => "Net Contents",
            LabelField::NameAddress => "Name and Address",
            LabelField::GovernmentWarning => "Government Warning",
            LabelField::CountryOfOrigin => "Country of Origin",
            LabelField::SulfiteDeclaration => "Sulfite Declaration",
        }
    }
}

impl std::fmt::Display for LabelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-field verdict. `Escalate` marks ambiguous-but-present values that
/// require human judgment and must never be auto-resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Pass,
    Fail,
    Unreadable,
    Escalate,
}

/// Label-level verdict, derived in strict priority order: ERROR, FAIL,
/// ESCALATE, PASS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Pass,
    Fail,
    Escalate,
    Error,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::Fail => "FAIL",
            OverallStatus::Escalate => "ESCALATE",
            OverallStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One evaluated field: status, extracted value, and failure detail with the
/// regulation citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldResult {
    pub field_name: String,
    pub status: FieldStatus,
    pub extracted_value: Option<String>,
    pub failure_reason: Option<String>,
    pub citation: Option<String>,
    pub found_on_image: Option<u8>,
}

impl FieldResult {
    pub fn pass(field: LabelField, value: Option<String>, image: Option<u8>) -> Self {
        Self {
            field_name: field.as_str().to_string(),
            status: FieldStatus::Pass,
            extracted_value: value,
            failure_reason: None,
            citation: None,
            found_on_image: image,
        }
    }

    pub fn fail(field: LabelField, reason: String, citation: &str, value: Option<String>) -> Self {
        Self {
            field_name: field.as_str().to_string(),
            status: FieldStatus::Fail,
            extracted_value: value,
            failure_reason: Some(reason),
            citation: Some(citation.to_string()),
            found_on_image: None,
        }
    }

    pub fn unreadable(field: LabelField, reason: String, citation: &str) -> Self {
        Self {
            field_name: field.as_str().to_string(),
            status: FieldStatus::Unreadable,
            extracted_value: None,
            failure_reason: Some(reason),
            citation: Some(citation.to_string()),
            found_on_image: None,
        }
    }

    pub fn escalate(
        field: LabelField,
        note: String,
        citation: &str,
        value: Option<String>,
        image: Option<u8>,
    ) -> Self {
        Self {
            field_name: field.as_str().to_string(),
            status: FieldStatus::Escalate,
            extracted_value: value,
            failure_reason: Some(note),
            citation: Some(citation.to_string()),
            found_on_image: image,
        }
    }
}

/// Terminal verdict for one label group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelResult {
    pub label_id: String,
    pub label_name: String,
    pub overall_status: OverallStatus,
    pub beverage_type: BeverageType,
    pub fields: Vec<FieldResult>,
    pub escalation_reason: Option<String>,
    pub images_processed: usize,
}

impl LabelResult {
    /// Converts a failure inside a work unit into an `ERROR` result, keeping
    /// the label attributable and the batch alive.
    pub fn processing_error(group: &LabelGroup, reason: String) -> Self {
        Self {
            label_id: group.label_id.clone(),
            label_name: group.label_name.clone(),
            overall_status: OverallStatus::Error,
            beverage_type: group.beverage_type.declared().unwrap_or(BeverageType::Spirits),
            fields: vec![FieldResult {
                field_name: "processing".to_string(),
                status: FieldStatus::Fail,
                extracted_value: None,
                failure_reason: Some(reason),
                citation: None,
                found_on_image: None,
            }],
            escalation_reason: None,
            images_processed: group.images.len(),
        }
    }
}

/// One completion event. `completed`/`total` are batch progress counters;
/// consumers correlate to labels by `label_id`, never by arrival position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvent {
    pub batch_id: String,
    pub completed: u32,
    pub total: u32,
    pub result: LabelResult,
}

/// Read-only final state of a finished batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub batch_id: String,
    pub total: u32,
    pub completed: u32,
    pub results: Vec<LabelResult>,
}
