use crate::core::schema;
use crate::domain::model::ListingBundle;
use crate::utils::error::GenError;
use serde_json::Value;

/// Pure function from raw model text to a validated bundle or a typed
/// condition. Decode failure yields `MalformedOutput`; schema violations
/// yield `InvalidSchema`. Never touches the network and never retries.
pub fn parse_listing_bundle(raw: &str) -> Result<ListingBundle, GenError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(raw)).map_err(|e| GenError::MalformedOutput {
            raw: raw.to_string(),
            error: e.to_string(),
        })?;

    schema::validate_bundle(&value).map_err(|violations| GenError::InvalidSchema {
        raw: raw.to_string(),
        violations,
    })
}

/// Models occasionally wrap the JSON object in a Markdown code fence even
/// when told not to. Unwrapping it is lossless; anything else about the
/// text stays untouched.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence line.
    match body.split_once('\n') {
        Some((first_line, tail)) if first_line.trim().chars().all(char::is_alphanumeric) => {
            tail.trim()
        }
        _ => body.trim(),
    }
}
