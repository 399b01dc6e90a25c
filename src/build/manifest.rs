use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Result, SearchError};
use crate::types::{Domain, FieldType};

/// Manifest format version this builder reads.
pub const MANIFEST_VERSION: u32 = 1;

/// `manifest.json` at the root of a build input directory.
#[derive(Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct InputManifest {
    pub version: u32,
    pub domains: Vec<DomainDefinition>,
}

/// How to turn one dataset file into index documents.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DomainDefinition {
    pub domain: Domain,
    /// JSON file (relative to the input directory) holding an array of rows
    pub documents: String,
    /// Row field carrying the document id
    pub id_field: String,
    /// Row fields to index, in order
    pub fields: Vec<FieldDefinition>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl InputManifest {
    pub fn parse(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.version != MANIFEST_VERSION {
            return Err(SearchError::InvalidInput(format!(
                "manifest version {} (expected {})",
                self.version, MANIFEST_VERSION
            )));
        }

        let mut seen = HashSet::new();
        for def in &self.domains {
            if !seen.insert(def.domain) {
                return Err(SearchError::InvalidInput(format!(
                    "domain `{}` listed twice",
                    def.domain
                )));
            }
            if def.fields.is_empty() {
                return Err(SearchError::InvalidInput(format!(
                    "domain `{}` indexes no fields",
                    def.domain
                )));
            }
            if def.id_field.is_empty() {
                return Err(SearchError::InvalidInput(format!(
                    "domain `{}` has an empty idField",
                    def.domain
                )));
            }
        }
        Ok(())
    }
}
