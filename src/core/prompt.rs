use crate::domain::model::{ContentPart, ImageInput, InvokerRequest, Lang};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub(crate) const SYSTEM_PROMPT: &str = "You generate product listings from photos for \
Kazakhstan/CIS marketplaces. You respond with a single JSON object matching the requested \
structure, and nothing else.";

const DEFAULT_MIME: &str = "image/jpeg";

/// Assembles the single outbound generation request: one instruction text
/// part followed by every image as an inline data URL, in input order
/// (order carries meaning, e.g. the first image is the primary angle).
/// Image bytes are encoded verbatim. Deterministic for identical input.
pub fn build_prompt(lang: Lang, hint: Option<&str>, images: &[ImageInput]) -> InvokerRequest {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(ContentPart::Text(render_instruction(lang, hint)));

    for image in images {
        // Zero-byte payloads carry nothing the model can look at.
        if image.bytes.is_empty() {
            continue;
        }
        parts.push(ContentPart::ImageUrl(to_data_url(
            &image.bytes,
            image.mime.as_deref(),
        )));
    }

    InvokerRequest {
        system: SYSTEM_PROMPT.to_string(),
        parts,
    }
}

fn render_instruction(lang: Lang, hint: Option<&str>) -> String {
    format!(
        r#"Requirements:
1) First build "universal" using ONLY what is visible in the photos.
2) Then generate 3 marketplace variants: olx, wildberries, ozon.
3) Do NOT invent facts. If uncertain, put it into "uncertainty" (and/or "compliance_todos").
4) Output language must be: {lang}.
5) If the user hint contradicts the photos, mention that in "uncertainty".

User hint (may be empty):
{hint}

Return ONLY a valid JSON object that matches EXACTLY this structure:

{{
  "lang": "ru|kz|en",
  "universal": {{
    "product_type": "string",
    "brand": "string|null",
    "model": "string|null",
    "color": "string|null",
    "material": "string|null",
    "condition": "string|null",
    "key_attributes": ["..."],
    "detected_text": ["..."],
    "uncertainty": ["..."]
  }},
  "listings": {{
    "olx": {{
      "title": "string",
      "bullets": ["..."],
      "description": "string",
      "keywords": ["..."],
      "attributes": {{"key":"value"}},
      "compliance_todos": ["..."],
      "uncertainty": ["..."]
    }},
    "wildberries": {{ "...same fields..." }},
    "ozon": {{ "...same fields..." }}
  }}
}}

All fields must be present, even if lists are empty."#,
        lang = lang.as_str(),
        hint = hint.unwrap_or(""),
    )
}

fn to_data_url(bytes: &[u8], mime: Option<&str>) -> String {
    let mime = match mime {
        Some(m) if !m.is_empty() => m,
        _ => DEFAULT_MIME,
    };
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(bytes: &[u8], mime: Option<&str>) -> ImageInput {
        let mut img = ImageInput::new(bytes.to_vec());
        if let Some(mime) = mime {
            img = img.with_mime(mime);
        }
        img
    }

    #[test]
    fn first_part_is_instruction_text() {
        let request = build_prompt(Lang::Ru, None, &[image(b"abc", None)]);
        match &request.parts[0] {
            ContentPart::Text(text) => {
                assert!(text.contains("Output language must be: ru"));
                assert!(text.contains("olx, wildberries, ozon"));
                assert!(text.contains("\"compliance_todos\""));
            }
            other => panic!("expected text part, got {:?}", other),
        }
    }

    #[test]
    fn preserves_image_order_and_bytes() {
        let images = vec![
            image(b"first", Some("image/png")),
            image(b"second", None),
            image(b"third", Some("image/webp")),
        ];
        let request = build_prompt(Lang::En, None, &images);

        let urls: Vec<&str> = request
            .parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::ImageUrl(url) => Some(url.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(
            urls,
            vec![
                format!("data:image/png;base64,{}", BASE64.encode(b"first")).as_str(),
                format!("data:image/jpeg;base64,{}", BASE64.encode(b"second")).as_str(),
                format!("data:image/webp;base64,{}", BASE64.encode(b"third")).as_str(),
            ]
        );
    }

    #[test]
    fn skips_empty_payloads() {
        let images = vec![image(b"", Some("image/png")), image(b"real", None)];
        let request = build_prompt(Lang::Kz, None, &images);
        assert_eq!(request.image_count(), 1);
    }

    #[test]
    fn includes_hint_when_present() {
        let request = build_prompt(Lang::Ru, Some("Nike sneakers, size 42"), &[image(b"x", None)]);
        let ContentPart::Text(text) = &request.parts[0] else {
            panic!("expected text part");
        };
        assert!(text.contains("Nike sneakers, size 42"));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let images = vec![image(b"photo", Some("image/jpeg"))];
        let a = build_prompt(Lang::En, Some("hint"), &images);
        let b = build_prompt(Lang::En, Some("hint"), &images);
        assert_eq!(a, b);
    }
}
