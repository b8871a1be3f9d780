//! Verdict resolution error types.

use thiserror::Error;

use crate::label::BeverageType;

/// Fatal rule-set problems, isolated to the affected label's work unit.
#[derive(Debug, Error)]
pub enum ValidationRuleError {
    /// The resolved beverage type has no usable rule table.
    #[error("no rule table for beverage type '{beverage}'")]
    MissingRuleTable { beverage: BeverageType },
}
