use crate::error::{ProcessingState, ProcessorError};
use crate::types::{null_as_empty, AttributeKey, HeaderIndex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Attribute-to-column assignments. An empty column name leaves the
/// attribute empty for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MappingTemplate {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub db_ci_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub db_ci_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub server_ci_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub server_ci_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cloud_component: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub load_balancer: String,
}

impl MappingTemplate {
    pub fn column(&self, key: AttributeKey) -> &str {
        match key {
            AttributeKey::DbCiName => &self.db_ci_name,
            AttributeKey::DbCiType => &self.db_ci_type,
            AttributeKey::ServerCiName => &self.server_ci_name,
            AttributeKey::ServerCiType => &self.server_ci_type,
            AttributeKey::CloudComponent => &self.cloud_component,
            AttributeKey::LoadBalancer => &self.load_balancer,
        }
    }

    pub fn with_column(mut self, key: AttributeKey, column: impl Into<String>) -> Self {
        let column = column.into();
        match key {
            AttributeKey::DbCiName => self.db_ci_name = column,
            AttributeKey::DbCiType => self.db_ci_type = column,
            AttributeKey::ServerCiName => self.server_ci_name = column,
            AttributeKey::ServerCiType => self.server_ci_type = column,
            AttributeKey::CloudComponent => self.cloud_component = column,
            AttributeKey::LoadBalancer => self.load_balancer = column,
        }
        self
    }

    /// Attributes that reference a column, in fixed attribute order.
    pub fn referenced_columns(&self) -> impl Iterator<Item = (AttributeKey, &str)> {
        AttributeKey::ALL
            .into_iter()
            .map(|key| (key, self.column(key)))
            .filter(|(_, column)| !column.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "APPLICATION_SERVICE_NAME")]
    pub application_service_name: String,
    #[serde(rename = "SERVICE_MAPPINGS")]
    pub service_mappings: Vec<MappingTemplate>,
}

impl Schema {
    pub fn new(application_service_name: impl Into<String>, template: MappingTemplate) -> Self {
        Self {
            application_service_name: application_service_name.into(),
            service_mappings: vec![template],
        }
    }

    /// Parses a schema document and checks its shape.
    pub fn from_json_str(json: &str) -> Result<Self, ProcessorError> {
        let schema: Schema = serde_json::from_str(json)
            .map_err(|e| ProcessorError::MalformedSchema(format!("{}", e)))?;
        schema.check_shape()?;
        Ok(schema)
    }

    /// Like [`Schema::from_json_str`], but tolerates `//` and `/* */` comments.
    pub fn from_jsonc_str(jsonc: &str) -> Result<Self, ProcessorError> {
        let mut stripped = String::with_capacity(jsonc.len());
        json_comments::StripComments::new(jsonc.as_bytes()).read_to_string(&mut stripped)?;
        Self::from_json_str(&stripped)
    }

    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self, ProcessorError> {
        let path = path.into();
        tracing::info!("Loading schema from {:?}", path);
        let contents = fs::read_to_string(&path)?;
        let schema = Self::from_jsonc_str(&contents)?;
        tracing::debug!("Loaded schema: {:?}", schema);
        Ok(schema)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProcessorError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        tracing::info!("Saved schema to {}", path.display());
        Ok(())
    }

    fn check_shape(&self) -> Result<(), ProcessorError> {
        if self.application_service_name.is_empty() {
            return Err(ProcessorError::MalformedSchema(
                "APPLICATION_SERVICE_NAME must name a column".into(),
            ));
        }
        if self.service_mappings.is_empty() {
            return Err(ProcessorError::MalformedSchema(
                "SERVICE_MAPPINGS must contain a mapping template".into(),
            ));
        }
        if self.service_mappings.len() > 1 {
            tracing::warn!(
                "Schema contains {} mapping templates; only the first is applied",
                self.service_mappings.len()
            );
        }
        Ok(())
    }

    /// The mapping template applied to every row (`SERVICE_MAPPINGS[0]`).
    pub fn template(&self) -> Result<&MappingTemplate, ProcessorError> {
        self.service_mappings.first().ok_or_else(|| {
            ProcessorError::MalformedSchema(
                "SERVICE_MAPPINGS must contain a mapping template".into(),
            )
        })
    }

    /// Template columns that are not present in `headers`, in attribute order.
    pub fn missing_template_columns(
        &self,
        headers: &HeaderIndex,
    ) -> Result<Vec<(AttributeKey, String)>, ProcessorError> {
        Ok(self
            .template()?
            .referenced_columns()
            .filter(|(_, column)| !headers.contains(column))
            .map(|(key, column)| (key, column.to_string()))
            .collect())
    }

    /// Checks the schema's column references against a CSV header.
    ///
    /// A missing service-name column is always fatal. Missing template
    /// columns resolve to empty strings at apply time, so they are recorded
    /// as warnings, or as errors when `is_strict` is set.
    pub fn validate_headers(
        &self,
        headers: &HeaderIndex,
        is_strict: bool,
    ) -> Result<ProcessingState, ProcessorError> {
        tracing::info!("Validating schema against CSV headers...");
        let mut state = ProcessingState::new();

        if !headers.contains(&self.application_service_name) {
            tracing::error!(
                "Service name column '{}' not in headers {:?}",
                self.application_service_name,
                headers.names()
            );
            return Err(ProcessorError::missing_column(
                &self.application_service_name,
                "APPLICATION_SERVICE_NAME is not a CSV header",
            ));
        }

        for (key, column) in self.missing_template_columns(headers)? {
            let message = format!("Column '{}' not found in CSV headers", column);
            if is_strict {
                tracing::error!("Column '{}' mapped to {} not found in CSV headers", column, key);
                state.add_error(message, Some(key.to_string()));
            } else {
                tracing::warn!(
                    "Column '{}' mapped to {} not found in CSV headers; {} will be empty for every row",
                    column,
                    key,
                    key
                );
                state.add_warning(message, Some(key.to_string()));
            }
        }

        Ok(state)
    }
}
