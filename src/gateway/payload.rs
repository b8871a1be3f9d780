//! Request payloads for the batch submission interface.

use serde::Deserialize;

use crate::label::LabelGroup;

/// Body of `POST /v1/verify/batch`: an ordered list of label groups.
#[derive(Debug, Deserialize)]
pub struct BatchVerifyRequest {
    pub labels: Vec<LabelGroup>,
}
