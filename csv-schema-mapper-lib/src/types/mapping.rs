use serde::{Deserialize, Deserializer, Serialize};

pub const APPLICATION_SERVICE_NAME: &str = "APPLICATION_SERVICE_NAME";
pub const SERVICE_MAPPINGS: &str = "SERVICE_MAPPINGS";

/// The fixed entity attributes a mapping template can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    DbCiName,
    DbCiType,
    ServerCiName,
    ServerCiType,
    CloudComponent,
    LoadBalancer,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 6] = [
        AttributeKey::DbCiName,
        AttributeKey::DbCiType,
        AttributeKey::ServerCiName,
        AttributeKey::ServerCiType,
        AttributeKey::CloudComponent,
        AttributeKey::LoadBalancer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::DbCiName => "DB_CI_NAME",
            AttributeKey::DbCiType => "DB_CI_TYPE",
            AttributeKey::ServerCiName => "SERVER_CI_NAME",
            AttributeKey::ServerCiType => "SERVER_CI_TYPE",
            AttributeKey::CloudComponent => "CLOUD_COMPONENT",
            AttributeKey::LoadBalancer => "LOAD_BALANCER",
        }
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `null` and missing attributes both read as an empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Attribute values for a single row.
///
/// Serializes with the six attribute keys in their fixed order. Absent data
/// and explicitly empty cells both come out as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ServiceMapping {
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

impl ServiceMapping {
    pub fn get(&self, key: AttributeKey) -> &str {
        match key {
            AttributeKey::DbCiName => &self.db_ci_name,
            AttributeKey::DbCiType => &self.db_ci_type,
            AttributeKey::ServerCiName => &self.server_ci_name,
            AttributeKey::ServerCiType => &self.server_ci_type,
            AttributeKey::CloudComponent => &self.cloud_component,
            AttributeKey::LoadBalancer => &self.load_balancer,
        }
    }

    pub fn set(&mut self, key: AttributeKey, value: impl Into<String>) {
        let slot = match key {
            AttributeKey::DbCiName => &mut self.db_ci_name,
            AttributeKey::DbCiType => &mut self.db_ci_type,
            AttributeKey::ServerCiName => &mut self.server_ci_name,
            AttributeKey::ServerCiType => &mut self.server_ci_type,
            AttributeKey::CloudComponent => &mut self.cloud_component,
            AttributeKey::LoadBalancer => &mut self.load_balancer,
        };
        *slot = value.into();
    }
}

/// One entry of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    #[serde(rename = "APPLICATION_SERVICE_NAME")]
    pub application_service_name: String,
    #[serde(rename = "SERVICE_MAPPINGS")]
    pub service_mappings: Vec<ServiceMapping>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_mapping_key_order() {
        let mut mapping = ServiceMapping::default();
        mapping.set(AttributeKey::LoadBalancer, "lb1");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(
            json,
            r#"{"DB_CI_NAME":"","DB_CI_TYPE":"","SERVER_CI_NAME":"","SERVER_CI_TYPE":"","CLOUD_COMPONENT":"","LOAD_BALANCER":"lb1"}"#
        );
    }

    #[test]
    fn test_get_set_cover_every_key() {
        let mut mapping = ServiceMapping::default();
        for key in AttributeKey::ALL {
            mapping.set(key, key.as_str().to_lowercase());
        }
        for key in AttributeKey::ALL {
            assert_eq!(mapping.get(key), key.as_str().to_lowercase());
        }
    }
}
