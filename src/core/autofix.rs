use crate::domain::model::{ContentPart, InvokerRequest};
use crate::utils::error::GenError;

/// Builds the corrective follow-up request for a failed first parse: the
/// original instruction for context, a machine-readable description of what
/// was wrong, and the offending output. Text-only; the model already stated
/// everything it saw in the photos in its previous answer.
pub fn corrective_request(
    original: &InvokerRequest,
    previous_raw: &str,
    failure: &GenError,
) -> InvokerRequest {
    let instruction = original
        .parts
        .iter()
        .find_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .unwrap_or_default();

    let text = format!(
        r#"Your previous JSON failed validation. Fix it to match the required structure exactly.
Return ONLY a valid JSON object.

What was wrong:
{problem}

The original task, for reference:
{instruction}

Your previous output:
{previous_raw}"#,
        problem = describe_failure(failure),
    );

    InvokerRequest {
        system: original.system.clone(),
        parts: vec![ContentPart::Text(text)],
    }
}

/// Precise error description for the corrective prompt: the decode error
/// for malformed output, the full ordered violation list for schema
/// failures. Summarizing would throw away exactly what the model needs.
pub fn describe_failure(failure: &GenError) -> String {
    match failure {
        GenError::MalformedOutput { error, .. } => format!("JSON decode error: {}", error),
        GenError::InvalidSchema { violations, .. } => violations
            .iter()
            .map(|v| format!("- {}", v))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Violation;

    fn original() -> InvokerRequest {
        InvokerRequest {
            system: "system".to_string(),
            parts: vec![
                ContentPart::Text("Generate listings in ru.".to_string()),
                ContentPart::ImageUrl("data:image/jpeg;base64,QUJD".to_string()),
            ],
        }
    }

    #[test]
    fn corrective_request_is_text_only_with_original_context() {
        let failure = GenError::MalformedOutput {
            raw: "oops".to_string(),
            error: "expected value at line 1 column 1".to_string(),
        };
        let request = corrective_request(&original(), "oops", &failure);

        assert_eq!(request.system, "system");
        assert_eq!(request.parts.len(), 1);
        let ContentPart::Text(text) = &request.parts[0] else {
            panic!("expected a single text part");
        };
        assert!(text.contains("expected value at line 1 column 1"));
        assert!(text.contains("Generate listings in ru."));
        assert!(text.contains("oops"));
    }

    #[test]
    fn schema_failure_lists_every_violation() {
        let failure = GenError::InvalidSchema {
            raw: String::new(),
            violations: vec![
                Violation {
                    path: "listings.ozon".to_string(),
                    reason: "missing required marketplace listing".to_string(),
                },
                Violation {
                    path: "lang".to_string(),
                    reason: "missing required field".to_string(),
                },
            ],
        };

        let description = describe_failure(&failure);
        assert_eq!(
            description,
            "- listings.ozon: missing required marketplace listing\n- lang: missing required field"
        );
    }
}
