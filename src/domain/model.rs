use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Target listing platforms. The set is fixed: every successful generation
/// covers all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Olx,
    Wildberries,
    Ozon,
}

impl Marketplace {
    pub const ALL: [Marketplace; 3] =
        [Marketplace::Olx, Marketplace::Wildberries, Marketplace::Ozon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::Olx => "olx",
            Marketplace::Wildberries => "wildberries",
            Marketplace::Ozon => "ozon",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language of a generated bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ru,
    Kz,
    En,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Ru, Lang::Kz, Lang::En];

    pub fn parse(tag: &str) -> Option<Lang> {
        match tag {
            "ru" => Some(Lang::Ru),
            "kz" => Some(Lang::Kz),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::Kz => "kz",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded photograph. Bytes are opaque to the pipeline and forwarded
/// to the model verbatim.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
    /// Caller-side identifier (filename), used for history records only.
    pub name: Option<String>,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: None,
            name: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// One incoming generation call. The language arrives as a raw tag and is
/// validated by the pipeline before any network call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub images: Vec<ImageInput>,
    pub lang: String,
    pub hint: Option<String>,
}

/// Product facts inferred from the photos, shared by all marketplace
/// variants. Nothing here is validated against a ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversalProduct {
    pub product_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub condition: Option<String>,
    pub key_attributes: Vec<String>,
    pub detected_text: Vec<String>,
    pub uncertainty: Vec<String>,
}

/// Listing text tailored to one marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingVariant {
    pub title: String,
    pub bullets: Vec<String>,
    pub description: String,
    pub keywords: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub compliance_todos: Vec<String>,
    pub uncertainty: Vec<String>,
}

/// One variant per marketplace. All three keys are mandatory; a partial
/// pack is never a valid terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplacePack {
    pub olx: ListingVariant,
    pub wildberries: ListingVariant,
    pub ozon: ListingVariant,
}

impl MarketplacePack {
    pub fn get(&self, marketplace: Marketplace) -> &ListingVariant {
        match marketplace {
            Marketplace::Olx => &self.olx,
            Marketplace::Wildberries => &self.wildberries,
            Marketplace::Ozon => &self.ozon,
        }
    }
}

/// The complete validated output of one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingBundle {
    pub lang: Lang,
    pub universal: UniversalProduct,
    pub listings: MarketplacePack,
}

/// Terminal success payload of the pipeline.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub bundle: ListingBundle,
    /// Wall time from prompt build start to final validation.
    pub elapsed: Duration,
    /// Whether the single auto-fix pass was needed.
    pub corrected: bool,
}

/// A single outbound request to the vision model: one system instruction
/// plus ordered user content parts.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokerRequest {
    pub system: String,
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Self-contained inline image reference (`data:` URL).
    ImageUrl(String),
}

impl InvokerRequest {
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::ImageUrl(_)))
            .count()
    }
}

/// What the history collaborator may record after a `Done` outcome.
/// The pipeline itself never reads or writes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub requestor: String,
    pub lang: Lang,
    pub hint: Option<String>,
    pub image_count: usize,
    pub image_names: Vec<String>,
    pub bundle: ListingBundle,
    pub product_type: String,
    pub brand: Option<String>,
    pub created_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_parses_known_tags_only() {
        assert_eq!(Lang::parse("ru"), Some(Lang::Ru));
        assert_eq!(Lang::parse("kz"), Some(Lang::Kz));
        assert_eq!(Lang::parse("en"), Some(Lang::En));
        assert_eq!(Lang::parse("de"), None);
        assert_eq!(Lang::parse("RU"), None);
        assert_eq!(Lang::parse(""), None);
    }

    #[test]
    fn marketplace_serializes_lowercase() {
        let json = serde_json::to_string(&Marketplace::Wildberries).unwrap();
        assert_eq!(json, "\"wildberries\"");
    }

    #[test]
    fn marketplace_all_is_canonical_order() {
        let tags: Vec<&str> = Marketplace::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(tags, vec!["olx", "wildberries", "ozon"]);
    }
}
