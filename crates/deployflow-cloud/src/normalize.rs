//! Resource normalization
//!
//! Turns a list of resources into the YAML configuration document submitted
//! to Deployment Manager. The resources are first serialized into a JSON
//! tree, which applies each property type's own serde attributes
//! (`skip_serializing_if`, `rename`, ...). Absent (`null`) object members are
//! then dropped, the tree is read back into a generic document and only then
//! written out as YAML. The YAML writer alone would emit every unset field.
//!
//! The output never contains a field the input did not carry, resources keep
//! their order, and normalizing a normalized document is a no-op.
//!
//! Deployment Manager reads configurations as YAML 1.1, so strings such as
//! `on` or `yes` are quoted to keep them strings on the remote side.

use crate::error::{DeployError, Result};
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Borrowed `{ resources: [...] }` wrapper for the first hop
#[derive(Serialize)]
struct ResourcesRef<'a, P> {
    resources: &'a [Resource<P>],
}

/// Generic document used for the second hop
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    resources: Vec<DocumentResource>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentResource {
    name: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    properties: Value,
}

/// Plain scalars a YAML 1.1 reader takes for booleans
const YAML11_BOOLEANS: [&str; 8] = ["y", "n", "yes", "no", "on", "off", "true", "false"];

/// Normalize resources into a YAML configuration document
pub fn normalize<P: Serialize>(resources: &[Resource<P>]) -> Result<String> {
    let tree = serde_json::to_value(ResourcesRef { resources })?;

    // JSON has no NaN or infinity, the first hop would turn them into absent fields
    for resource in resources {
        let properties = serde_yaml::to_value(&resource.properties)?;
        if contains_non_finite(&properties) {
            return Err(non_finite(&resource.name));
        }
    }

    let document = render(tree)?;

    tracing::debug!(
        "Normalized {} resources into {} bytes of configuration",
        resources.len(),
        document.len()
    );
    Ok(document)
}

/// Same as [`normalize`], returned as raw bytes
pub fn normalize_to_bytes<P: Serialize>(resources: &[Resource<P>]) -> Result<Vec<u8>> {
    normalize(resources).map(String::into_bytes)
}

/// Re-normalize an existing configuration document
pub fn normalize_document(document: &str) -> Result<String> {
    let raw: serde_yaml::Value = serde_yaml::from_str(document)?;
    let parsed: Document = serde_yaml::from_value(raw.clone())?;

    if let Some(resources) = raw.get("resources").and_then(serde_yaml::Value::as_sequence) {
        for (resource, parsed) in resources.iter().zip(&parsed.resources) {
            if resource.get("properties").is_some_and(contains_non_finite) {
                return Err(non_finite(&parsed.name));
            }
        }
    }

    render(serde_json::to_value(parsed)?)
}

fn render(mut tree: Value) -> Result<String> {
    strip_absent(&mut tree);
    let document: Document = serde_json::from_value(tree)?;

    let mut out = String::new();
    match serde_json::to_value(&document)? {
        Value::Object(root) => write_mapping(&mut out, &root, 0, false)?,
        other => {
            return Err(DeployError::InvalidResources(format!(
                "unexpected document root: {}",
                other
            )));
        }
    }
    Ok(out)
}

/// Drop `null` object members, recursively. Array elements are kept in
/// place since their position is significant.
fn strip_absent(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_absent);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_absent),
        _ => {}
    }
}

fn contains_non_finite(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Number(n) => n.as_f64().is_some_and(|f| !f.is_finite()),
        serde_yaml::Value::Sequence(items) => items.iter().any(contains_non_finite),
        serde_yaml::Value::Mapping(map) => map
            .iter()
            .any(|(k, v)| contains_non_finite(k) || contains_non_finite(v)),
        serde_yaml::Value::Tagged(tagged) => contains_non_finite(&tagged.value),
        _ => false,
    }
}

fn non_finite(resource: &str) -> DeployError {
    DeployError::InvalidResources(format!(
        "resource {} has a NaN or infinite number in its properties",
        resource
    ))
}

// ============ YAML Emitter ============
//
// Block style, laid out the way serde_yaml lays it out. Scalars are
// formatted by serde_yaml, except YAML 1.1 booleans which get quoted.

fn write_mapping(
    out: &mut String,
    map: &Map<String, Value>,
    indent: usize,
    inline_first: bool,
) -> Result<()> {
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, indent);
        }
        out.push_str(&string_scalar(key)?);
        out.push(':');
        match value {
            Value::Object(m) if !m.is_empty() => {
                out.push('\n');
                write_mapping(out, m, indent + 2, false)?;
            }
            Value::Array(a) if !a.is_empty() => {
                out.push('\n');
                write_sequence(out, a, indent, false)?;
            }
            other => {
                out.push(' ');
                out.push_str(&scalar(other)?);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize, inline_first: bool) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !inline_first {
            pad(out, indent);
        }
        out.push_str("- ");
        match item {
            Value::Object(m) if !m.is_empty() => write_mapping(out, m, indent + 2, true)?,
            Value::Array(a) if !a.is_empty() => write_sequence(out, a, indent + 2, true)?,
            other => {
                out.push_str(&scalar(other)?);
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

fn scalar(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => serde_yaml::to_string(n)?.trim_end().to_string(),
        Value::String(s) => string_scalar(s)?,
        Value::Array(_) => "[]".to_string(),
        Value::Object(_) => "{}".to_string(),
    })
}

fn string_scalar(s: &str) -> Result<String> {
    if YAML11_BOOLEANS.iter().any(|b| b.eq_ignore_ascii_case(s)) {
        return Ok(format!("'{}'", s));
    }

    let emitted = serde_yaml::to_string(s)?;
    let emitted = emitted.strip_suffix('\n').unwrap_or(&emitted);
    if emitted.contains('\n') {
        // multi-line or folded: a JSON string is a valid double-quoted YAML scalar
        return Ok(serde_json::to_string(s)?);
    }
    Ok(emitted.to_string())
}

impl<P: Serialize> crate::resource::ResourceSet<P> {
    /// Normalized YAML configuration document for this set
    pub fn to_document(&self) -> Result<String> {
        normalize(&self.resources)
    }
}
