use crate::reader::CsvSample;

/// Builds the schema-inference instruction for a CSV sample.
///
/// Headers and sample rows are rendered as JSON arrays so cell values with
/// commas or quotes stay unambiguous.
pub fn build_schema_prompt(sample: &CsvSample) -> String {
    let headers = serde_json::to_string(&sample.headers).unwrap_or_default();
    let rows = if sample.rows.is_empty() {
        "(no sample rows)".to_string()
    } else {
        sample
            .rows
            .iter()
            .map(|row| serde_json::to_string(row).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"
You are a data transformation engine.
Your task is to infer a JSON mapping schema based on CSV headers and a few sample rows.
Each row maps to exactly one entity type (Server, Database, Cloud, Load Balancer).
Never populate more than one entity type in a single JSON object.

CSV Headers:
{headers}

Sample Rows:
{rows}

Output strictly in JSON. Example format:

{{
  "APPLICATION_SERVICE_NAME": "<column name>",
  "SERVICE_MAPPINGS": [
    {{
      "DB_CI_NAME": "<column or empty string>",
      "DB_CI_TYPE": "<column or empty string>",
      "SERVER_CI_NAME": "<column or empty string>",
      "SERVER_CI_TYPE": "<column or empty string>",
      "CLOUD_COMPONENT": "<column or empty string>",
      "LOAD_BALANCER": "<column or empty string>"
    }}
  ]
}}
"#
    )
}
