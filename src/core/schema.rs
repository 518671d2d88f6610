use crate::domain::model::{
    Lang, ListingBundle, ListingVariant, Marketplace, MarketplacePack, UniversalProduct,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One schema violation, qualified by the path of the offending field
/// (e.g. `listings.ozon.bullets`). The corrective prompt is built from
/// these, so reasons must be precise enough to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

impl Violation {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Validation entry point: checks that a decoded value structurally matches
/// `ListingBundle` and returns either the typed bundle or the ordered list
/// of violations. Pure and deterministic; validating an accepted bundle's
/// serialized form accepts it again.
pub fn validate_bundle(value: &Value) -> Result<ListingBundle, Vec<Violation>> {
    let Some(root) = value.as_object() else {
        return Err(vec![Violation::new(
            "$",
            format!("expected object, got {}", type_name(value)),
        )]);
    };

    let mut violations = Vec::new();

    let lang = check_lang(root, &mut violations);
    let universal = match root.get("universal") {
        Some(value) => check_universal(value, &mut violations),
        None => {
            violations.push(Violation::new("universal", "missing required field"));
            None
        }
    };
    let listings = check_listings(root, &mut violations);

    if violations.is_empty() {
        if let (Some(lang), Some(universal), Some(listings)) = (lang, universal, listings) {
            return Ok(ListingBundle {
                lang,
                universal,
                listings,
            });
        }
    }
    Err(violations)
}

fn check_lang(root: &Map<String, Value>, violations: &mut Vec<Violation>) -> Option<Lang> {
    match root.get("lang") {
        None => {
            violations.push(Violation::new("lang", "missing required field"));
            None
        }
        Some(Value::String(tag)) => match Lang::parse(tag) {
            Some(lang) => Some(lang),
            None => {
                violations.push(Violation::new(
                    "lang",
                    format!("unknown language tag '{}', expected one of ru, kz, en", tag),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(Violation::new(
                "lang",
                format!("expected string, got {}", type_name(other)),
            ));
            None
        }
    }
}

fn check_universal(value: &Value, violations: &mut Vec<Violation>) -> Option<UniversalProduct> {
    let path = "universal";
    let Some(obj) = value.as_object() else {
        violations.push(Violation::new(
            path,
            format!("expected object, got {}", type_name(value)),
        ));
        return None;
    };

    let product_type = required_string(obj, path, "product_type", violations);
    let brand = nullable_string(obj, path, "brand", violations);
    let model = nullable_string(obj, path, "model", violations);
    let color = nullable_string(obj, path, "color", violations);
    let material = nullable_string(obj, path, "material", violations);
    let condition = nullable_string(obj, path, "condition", violations);
    let key_attributes = defaulted_string_list(obj, path, "key_attributes", violations);
    let detected_text = defaulted_string_list(obj, path, "detected_text", violations);
    let uncertainty = defaulted_string_list(obj, path, "uncertainty", violations);

    Some(UniversalProduct {
        product_type: product_type?,
        brand: brand?,
        model: model?,
        color: color?,
        material: material?,
        condition: condition?,
        key_attributes: key_attributes?,
        detected_text: detected_text?,
        uncertainty: uncertainty?,
    })
}

fn check_listings(
    root: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Option<MarketplacePack> {
    let value = match root.get("listings") {
        Some(value) => value,
        None => {
            violations.push(Violation::new("listings", "missing required field"));
            return None;
        }
    };
    let Some(obj) = value.as_object() else {
        violations.push(Violation::new(
            "listings",
            format!("expected object, got {}", type_name(value)),
        ));
        return None;
    };

    let mut variants: [Option<ListingVariant>; 3] = [None, None, None];
    for (slot, marketplace) in variants.iter_mut().zip(Marketplace::ALL) {
        let path = format!("listings.{}", marketplace);
        match obj.get(marketplace.as_str()) {
            Some(value) => *slot = check_variant(value, &path, violations),
            None => violations.push(Violation::new(path, "missing required marketplace listing")),
        }
    }

    let [olx, wildberries, ozon] = variants;
    Some(MarketplacePack {
        olx: olx?,
        wildberries: wildberries?,
        ozon: ozon?,
    })
}

fn check_variant(
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<ListingVariant> {
    let Some(obj) = value.as_object() else {
        violations.push(Violation::new(
            path,
            format!("expected object, got {}", type_name(value)),
        ));
        return None;
    };

    let title = required_string(obj, path, "title", violations);
    let bullets = required_string_list(obj, path, "bullets", violations);
    let description = required_string(obj, path, "description", violations);
    let keywords = required_string_list(obj, path, "keywords", violations);
    let attributes = attribute_map(obj, path, "attributes", violations);
    let compliance_todos = defaulted_string_list(obj, path, "compliance_todos", violations);
    let uncertainty = defaulted_string_list(obj, path, "uncertainty", violations);

    Some(ListingVariant {
        title: title?,
        bullets: bullets?,
        description: description?,
        keywords: keywords?,
        attributes: attributes?,
        compliance_todos: compliance_todos?,
        uncertainty: uncertainty?,
    })
}

fn required_string(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(field) {
        None => {
            violations.push(Violation::new(
                field_path(parent, field),
                "missing required field",
            ));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::new(
                field_path(parent, field),
                format!("expected string, got {}", type_name(other)),
            ));
            None
        }
    }
}

/// Optional field: absent and `null` both mean "not detected".
fn nullable_string(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(other) => {
            violations.push(Violation::new(
                field_path(parent, field),
                format!("expected string or null, got {}", type_name(other)),
            ));
            None
        }
    }
}

fn required_string_list(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        None => {
            violations.push(Violation::new(
                field_path(parent, field),
                "missing required field",
            ));
            None
        }
        Some(value) => string_list(value, &field_path(parent, field), violations),
    }
}

/// List field with an empty-list default when absent.
fn defaulted_string_list(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        None => Some(Vec::new()),
        Some(value) => string_list(value, &field_path(parent, field), violations),
    }
}

fn string_list(value: &Value, path: &str, violations: &mut Vec<Violation>) -> Option<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        // A singleton string is never auto-wrapped into a sequence.
        Value::String(_) => {
            violations.push(Violation::new(
                path,
                "expected sequence of strings, got single string",
            ));
            return None;
        }
        other => {
            violations.push(Violation::new(
                path,
                format!("expected sequence of strings, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (idx, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => out.push(s.clone()),
            other => {
                violations.push(Violation::new(
                    format!("{}[{}]", path, idx),
                    format!("expected string, got {}", type_name(other)),
                ));
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

/// String-to-string attribute map. Scalar values are stringified (lossless
/// display form); arrays and objects are violations.
fn attribute_map(
    obj: &Map<String, Value>,
    parent: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<BTreeMap<String, String>> {
    let path = field_path(parent, field);
    let entries = match obj.get(field) {
        None => return Some(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            violations.push(Violation::new(
                path,
                format!("expected object of string attributes, got {}", type_name(other)),
            ));
            return None;
        }
    };

    let mut out = BTreeMap::new();
    let mut ok = true;
    for (key, value) in entries {
        match value {
            Value::String(s) => {
                out.insert(key.clone(), s.clone());
            }
            Value::Number(n) => {
                out.insert(key.clone(), n.to_string());
            }
            Value::Bool(b) => {
                out.insert(key.clone(), b.to_string());
            }
            other => {
                violations.push(Violation::new(
                    format!("{}.{}", path, key),
                    format!("expected string-like value, got {}", type_name(other)),
                ));
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

fn field_path(parent: &str, field: &str) -> String {
    format!("{}.{}", parent, field)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
