//! Per-beverage-type mandatory field rules.
//!
//! Rule tables are pure static data: one ordered table per beverage type, each
//! entry carrying the regulation citation and an optional condition evaluated
//! against already-extracted label data. Adding a beverage type means adding a
//! table, not a type hierarchy.

pub mod warning;


pub use warning::{CANONICAL_WARNING, WarningVerdict, verify_warning};

use crate::label::{BeverageType, LabelField};

/// Read-only view over extracted label data, used by rule conditions.
///
/// Implemented by the extraction layer's field map; keeping the trait here
/// leaves the rule set free of extraction dependencies.
pub trait ExtractedView {
    fn value_of(&self, field: LabelField) -> Option<&str>;
}

/// When a rule applies to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// The name/address block names an importer. Imported goods must carry a
    /// country of origin, and imported wine a sulfite declaration.
    ImporterAddressPresent,
}

impl Condition {
    pub fn applies(&self, extracted: &dyn ExtractedView) -> bool {
        match self {
            Condition::Always => true,
            Condition::ImporterAddressPresent => extracted
                .value_of(LabelField::NameAddress)
                .is_some_and(|addr| addr.to_ascii_lowercase().contains("import")),
        }
    }
}

/// One mandatory or conditional field requirement.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: LabelField,
    pub citation: &'static str,
    pub condition: Condition,
}

const fn rule(field: LabelField, citation: &'static str) -> FieldRule {
    FieldRule {
        field,
        citation,
        condition: Condition::Always,
    }
}

const fn conditional(field: LabelField, citation: &'static str, condition: Condition) -> FieldRule {
    FieldRule {
        field,
        citation,
        condition,
    }
}

const SPIRITS_RULES: &[FieldRule] = &[
    rule(LabelField::BrandName, "27 CFR 5.32"),
    rule(LabelField::ClassType, "27 CFR 5.32"),
    rule(LabelField::AlcoholContent, "27 CFR 5.37"),
    rule(LabelField::NetContents, "27 CFR 5.38"),
    rule(LabelField::NameAddress, "27 CFR 5.36"),
    conditional(
        LabelField::CountryOfOrigin,
        "27 CFR 5.69",
        Condition::ImporterAddressPresent,
    ),
    rule(LabelField::GovernmentWarning, "27 CFR Part 16"),
];

// Alcohol content is optional on malt beverage labels (27 CFR 7.63); the ABV
// abbreviation rule in `classify_alcohol_content` still applies when stated.
const BEER_RULES: &[FieldRule] = &[
    rule(LabelField::BrandName, "27 CFR 7.64"),
    rule(LabelField::ClassType, "27 CFR 7.141"),
    rule(LabelField::NetContents, "27 CFR 7.70"),
    rule(LabelField::NameAddress, "27 CFR 7.66"),
    conditional(
        LabelField::CountryOfOrigin,
        "27 CFR 7.69",
        Condition::ImporterAddressPresent,
    ),
    rule(LabelField::GovernmentWarning, "27 CFR Part 16"),
];

const WINE_RULES: &[FieldRule] = &[
    rule(LabelField::BrandName, "27 CFR 4.32"),
    rule(LabelField::ClassType, "27 CFR 4.34"),
    rule(LabelField::AlcoholContent, "27 CFR 4.36"),
    rule(LabelField::NetContents, "27 CFR 4.72"),
    rule(LabelField::NameAddress, "27 CFR 4.35"),
    conditional(
        LabelField::CountryOfOrigin,
        "27 CFR 4.35",
        Condition::ImporterAddressPresent,
    ),
    conditional(
        LabelField::SulfiteDeclaration,
        "27 CFR 4.32(e)",
        Condition::ImporterAddressPresent,
    ),
    rule(LabelField::GovernmentWarning, "27 CFR Part 16"),
];

/// Ordered rule table for a beverage type.
pub fn rule_table(beverage: BeverageType) -> &'static [FieldRule] {
    match beverage {
        BeverageType::Spirits => SPIRITS_RULES,
        BeverageType::Beer => BEER_RULES,
        BeverageType::Wine => WINE_RULES,
    }
}

/// Fields a rule table requires given the extracted data so far. Conditional
/// entries are included only when their predicate holds.
pub fn required_fields(
    beverage: BeverageType,
    extracted: &dyn ExtractedView,
) -> Vec<&'static FieldRule> {
    rule_table(beverage)
        .iter()
        .filter(|r| r.condition.applies(extracted))
        .collect()
}

/// Returns an escalation note when an alcohol-content statement uses a
/// non-permitted abbreviation. Numerically present but ambiguously stated
/// values require agent review rather than a hard fail.
pub fn classify_alcohol_content(value: &str) -> Option<&'static str> {
    if value.to_ascii_uppercase().contains("ABV") {
        Some("Alcohol content uses non-permitted abbreviation 'ABV'; requires review")
    } else {
        None
    }
}

/// Outcome of matching a class/type designation against the known strings for
/// a beverage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignationMatch {
    Known,
    /// Not a known designation; plausibly a synonym, so never auto-failed.
    Unrecognized,
}

const SPIRITS_DESIGNATIONS: &[&str] = &[
    "whiskey", "whisky", "bourbon", "gin", "rum", "vodka", "tequila", "brandy", "liqueur",
    "cordial",
];
const BEER_DESIGNATIONS: &[&str] = &[
    "beer", "ale", "lager", "stout", "porter", "pilsner", "ipa", "malt",
];
const WINE_DESIGNATIONS: &[&str] = &[
    "wine",
    "cabernet",
    "merlot",
    "pinot",
    "chardonnay",
    "sauvignon",
    "sparkling",
    "riesling",
    "zinfandel",
];

/// Matches a class/type designation against the known designation strings for
/// the resolved beverage type.
pub fn classify_designation(beverage: BeverageType, value: &str) -> DesignationMatch {
    let lower = value.to_ascii_lowercase();
    let known = match beverage {
        BeverageType::Spirits => SPIRITS_DESIGNATIONS,
        BeverageType::Beer => BEER_DESIGNATIONS,
        BeverageType::Wine => WINE_DESIGNATIONS,
    };
    if known.iter().any(|d| lower.contains(d)) {
        DesignationMatch::Known
    } else {
        DesignationMatch::Unrecognized
    }
}
