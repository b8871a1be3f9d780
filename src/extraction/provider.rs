//! Vision-model extraction provider backed by `genai`.

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest, ContentPart, MessageContent};
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::intake::ImageBytes;
use crate::label::LabelField;
use crate::rules::CANONICAL_WARNING;

use super::error::ProviderError;
use super::{FieldExtractor, FieldMap, PromptVariant};

/// Extraction adapter calling a vision-capable chat model.
///
/// Provider routing and credentials are handled by the `genai` client's own
/// environment conventions. With `LABELCHECK_MOCK_PROVIDER` set, returns a
/// canned complete payload instead of calling out.
pub struct GenaiExtractor {
    client: Client,
    model: String,
    timeout: Duration,
    mock_provider: bool,
}

impl GenaiExtractor {
    pub fn new(model: String, timeout: Duration) -> Self {
        let mock_provider =
            std::env::var_os("LABELCHECK_MOCK_PROVIDER").is_some_and(|v| !v.is_empty());
        Self {
            client: Client::default(),
            model,
            timeout,
            mock_provider,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn instruction(variant: PromptVariant, wanted: &[LabelField]) -> String {
        let keys = wanted
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut instruction = format!(
            "Extract required TTB label fields from these product label images. \
             Return strict JSON only with keys: {keys}, beverage_type, \
             unreadable_fields (array of keys), field_sources (object mapping key \
             to 1-based image number). Set beverage_type to one of: spirits, beer, wine. \
             Omit keys that do not appear on any image."
        );
        if variant == PromptVariant::DegradedImageSpecialized {
            instruction
                .push_str(" Focus on noisy, low-contrast text and infer layout context where possible.");
        }
        instruction
    }
}

impl FieldExtractor for GenaiExtractor {
    async fn extract(
        &self,
        images: &[ImageBytes],
        variant: PromptVariant,
        wanted: &[LabelField],
    ) -> Result<FieldMap, ProviderError> {
        if self.mock_provider {
            debug!("Mock provider enabled - returning canned extraction payload");
            return Ok(canned_payload(wanted));
        }

        let mut content = MessageContent::default();
        content.push(ContentPart::Text(Self::instruction(variant, wanted)));
        for image in images {
            content.push(ContentPart::from_image_base64(
                image.mime,
                BASE64.encode(&image.bytes),
            ));
        }
        let request = ChatRequest::new(vec![ChatMessage::user(content)]);

        info!(
            model = %self.model,
            variant = ?variant,
            image_count = images.len(),
            wanted = wanted.len(),
            "Calling extraction provider"
        );

        let response = tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, request, None),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))?
        .map_err(|e| {
            error!("Provider error: {}", e);
            classify_provider_error(&e.to_string())
        })?;

        let text = response
            .first_text()
            .ok_or_else(|| ProviderError::MalformedResponse("no text content".to_string()))?;

        parse_payload(text)
    }
}

/// Maps a provider error message onto the taxonomy. The underlying client
/// flattens HTTP detail into strings, so this goes by message content.
fn classify_provider_error(message: &str) -> ProviderError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") || lower.contains("api key") {
        ProviderError::Auth(message.to_string())
    } else if lower.contains("429") || lower.contains("rate limit") {
        ProviderError::RateLimited(message.to_string())
    } else {
        ProviderError::Transport(message.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct WirePayload {
    beverage_type: Option<String>,
    brand_name: Option<String>,
    class_type: Option<String>,
    alcohol_content: Option<String>,
    net_contents: Option<String>,
    name_address: Option<String>,
    government_warning: Option<String>,
    country_of_origin: Option<String>,
    sulfite_declaration: Option<String>,
    #[serde(default)]
    unreadable_fields: Vec<String>,
    #[serde(default)]
    field_sources: HashMap<String, u8>,
}

impl WirePayload {
    fn value(&self, field: LabelField) -> Option<&String> {
        match field {
            LabelField::BrandName => self.brand_name.as_ref(),
            LabelField::ClassType => self.class_type.as_ref(),
            LabelField::AlcoholContent => self.alcohol_content.as_ref(),
            LabelField::NetContents => self.net_contents.as_ref(),
            LabelField::NameAddress => self.name_address.as_ref(),
            LabelField::GovernmentWarning => self.government_warning.as_ref(),
            LabelField::CountryOfOrigin => self.country_of_origin.as_ref(),
            LabelField::SulfiteDeclaration => self.sulfite_declaration.as_ref(),
        }
    }
}

/// Parses the provider's JSON reply, tolerating surrounding prose or fences.
pub(crate) fn parse_payload(text: &str) -> Result<FieldMap, ProviderError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if e > s => &text[s..=e],
        _ => {
            return Err(ProviderError::MalformedResponse(
                "response contains no JSON object".to_string(),
            ));
        }
    };

    let payload: WirePayload = serde_json::from_str(json)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    let mut map = FieldMap::new();
    for field in LabelField::ALL {
        if let Some(value) = payload.value(field) {
            let source = payload.field_sources.get(field.as_str()).copied();
            map.insert(field, value.clone(), source);
        }
    }
    for name in &payload.unreadable_fields {
        if let Some(field) = LabelField::parse(name) {
            map.mark_unreadable(field);
        }
    }
    map.set_detected_type(payload.beverage_type);
    Ok(map)
}

fn canned_payload(wanted: &[LabelField]) -> FieldMap {
    let mut map = FieldMap::new();
    for field in wanted {
        let value = match field {
            LabelField::BrandName => "Old Creek Reserve",
            LabelField::ClassType => "Kentucky Straight Bourbon Whiskey",
            LabelField::AlcoholContent => "45% Alc./Vol.",
            LabelField::NetContents => "750 mL",
            LabelField::NameAddress => "Old Creek Distilling Co., Louisville, KY",
            LabelField::GovernmentWarning => CANONICAL_WARNING,
            LabelField::CountryOfOrigin | LabelField::SulfiteDeclaration => continue,
        };
        map.insert(*field, value.to_string(), Some(1));
    }
    map.set_detected_type(Some("spirits".to_string()));
    map
}
