//! Manifest context forwarded into generator prompts.
//!
//! The context is an opaque JSON value. Only [`ManifestContext::from_package_json`]
//! looks inside the manifest, to pick the parts that describe the UI surface.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::error::{Result, UifixError};

/// Opaque project metadata passed through to prompts unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ManifestContext(pub Value);

fn field_or(value: Option<&Value>, default: Value) -> Value {
    match value {
        Some(v) if !v.is_null() => v.clone(),
        _ => default,
    }
}

impl ManifestContext {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Derive the prompt-relevant parts of an extension `package.json`.
    pub fn from_package_json(manifest: &Value) -> Self {
        let str_field = |key: &str| {
            manifest
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("undefined")
                .to_string()
        };
        let contributes = manifest.get("contributes");
        let contributed = |key: &str| contributes.and_then(|c| c.get(key));

        Self(json!({
            "extensionId": format!("{}.{}", str_field("publisher"), str_field("name")),
            "activationEvents": field_or(manifest.get("activationEvents"), Value::Array(vec![])),
            "commands": field_or(contributed("commands"), Value::Array(vec![])),
            "menus": field_or(contributed("menus"), Value::Object(Map::new())),
            "submenus": field_or(contributed("submenus"), Value::Object(Map::new())),
            "viewsWelcome": field_or(contributed("viewsWelcome"), Value::Array(vec![])),
            "configProperties": field_or(
                contributed("configuration").and_then(|c| c.get("properties")),
                Value::Object(Map::new()),
            ),
        }))
    }

    /// Read `<root>/package.json` and derive its relevant parts.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("package.json");
        let raw = std::fs::read_to_string(&path).map_err(|e| UifixError::ManifestRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let manifest: Value = serde_json::from_str(&raw).map_err(|e| UifixError::ManifestRead {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_package_json(&manifest))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Pretty-printed JSON for embedding in prompts.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}
