//! Resource descriptors submitted as deployment configuration

use crate::error::{DeployError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// A single declarative resource.
///
/// `properties` is opaque to this crate: it is serialized as-is and never
/// inspected. Any `Serialize` type works, including SDK structs that use
/// `skip_serializing_if` for unset fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<P = serde_json::Value> {
    /// Resource name, unique within the deployment
    pub name: String,

    /// Resource type (e.g., "compute.v1.instance")
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Type-specific properties, absent when the resource sets none
    #[serde(default)]
    pub properties: P,
}

impl<P> Resource<P> {
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>, properties: P) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            properties,
        }
    }
}

/// Ordered set of resources, serialized under a single `resources` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
pub struct ResourceSet<P = serde_json::Value> {
    pub resources: Vec<Resource<P>>,
}

impl<P> Default for ResourceSet<P> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
        }
    }
}

impl<P> ResourceSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: Resource<P>) {
        self.resources.push(resource);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource<P>> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<P> From<Vec<Resource<P>>> for ResourceSet<P> {
    fn from(resources: Vec<Resource<P>>) -> Self {
        Self { resources }
    }
}

impl ResourceSet {
    /// Parse a resource set from YAML (JSON is accepted as well)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a resource set from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a resource set file, choosing the parser by extension
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;

        let set = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            other => {
                return Err(DeployError::InvalidResources(format!(
                    "unsupported resource file extension: {}",
                    other.unwrap_or("(none)")
                )));
            }
        };

        tracing::debug!("Loaded {} resources from {}", set.len(), path.display());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_type_field_name() {
        let resource = Resource::new("vm-1", "compute.v1.instance", json!({"zone": "us-central1-f"}));
        let value = serde_json::to_value(&resource).unwrap();

        assert_eq!(value["type"], "compute.v1.instance");
        assert!(value.get("resource_type").is_none());
    }

    #[test]
    fn test_resource_set_preserves_order() {
        let mut set = ResourceSet::new();
        set.add(Resource::new("b", "t", json!({})));
        set.add(Resource::new("a", "t", json!({})));

        let names: Vec<_> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
resources:
  - name: my-bucket
    type: storage.v1.bucket
    properties:
      location: US
"#;
        let set = ResourceSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.resources[0].resource_type, "storage.v1.bucket");
        assert_eq!(set.resources[0].properties["location"], "US");
    }

    #[test]
    fn test_rendered_document_loads_back() {
        let set = ResourceSet::from(vec![
            Resource::new("empty", "t", serde_json::Value::Null),
            Resource::new("bucket", "storage.v1.bucket", json!({"location": "US"})),
        ]);
        let document = set.to_document().unwrap();
        assert!(!document.contains("properties: null"));

        let loaded = ResourceSet::from_yaml_str(&document).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_from_yaml_str_missing_resources() {
        let result = ResourceSet::from_yaml_str("items: []");
        assert!(matches!(result, Err(DeployError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_extension() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("resources.toml");
        std::fs::write(&path, "resources = []").unwrap();

        let result = ResourceSet::load(&path).await;
        assert!(matches!(result, Err(DeployError::InvalidResources(_))));
    }

    #[tokio::test]
    async fn test_load_json_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("resources.json");
        std::fs::write(
            &path,
            r#"{"resources": [{"name": "net", "type": "compute.v1.network", "properties": {"autoCreateSubnetworks": true}}]}"#,
        )
        .unwrap();

        let set = ResourceSet::load(&path).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.resources[0].properties["autoCreateSubnetworks"], true);
    }
}
