//! Validation and escalation resolution.
//!
//! Consumes an extraction outcome plus the requested beverage type and
//! produces the final label verdict with field-level detail. The label status
//! priority encodes the product rule: objective absence is always FAIL,
//! ambiguity is always ESCALATE, never auto-FAIL, and never silently PASS.

pub mod error;
pub mod resolver;


pub use error::ValidationRuleError;
pub use resolver::{BeverageTypeResolver, KeywordResolver, resolve};
