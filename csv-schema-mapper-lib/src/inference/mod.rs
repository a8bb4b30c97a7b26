mod prompt;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

pub use prompt::build_schema_prompt;

use crate::error::ProcessorError;
use crate::model::LanguageModel;
use crate::reader::CsvSample;
use crate::schema::Schema;

pub const DEFAULT_SAMPLE_ROWS: usize = 5;

// A whole response wrapped in one ``` or ```json fence
static CODE_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").unwrap());

/// Unwraps a response that arrived as a single markdown code block.
pub fn strip_code_fence(response: &str) -> &str {
    match CODE_FENCE_REGEX.captures(response).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => response.trim(),
    }
}

/// Parses a raw model response into a schema.
///
/// Only JSON shape is checked here; columns that don't exist in the CSV are
/// handled when the schema is applied.
pub fn parse_schema_response(response: &str) -> Result<Schema, ProcessorError> {
    let body = strip_code_fence(response);
    Schema::from_json_str(body).map_err(|e| {
        tracing::error!("Model response is not a usable schema: {}", e);
        tracing::debug!("Raw model response: {}", response);
        e
    })
}

/// Sample, prompt, call the model once, parse.
pub struct InferenceManager {
    sample_rows: usize,
}

impl InferenceManager {
    pub fn new(sample_rows: usize) -> Self {
        Self { sample_rows }
    }

    pub fn sample_rows(&self) -> usize {
        self.sample_rows
    }

    pub fn sample<P: AsRef<Path>>(
        &self,
        csv_path: P,
        delimiter: u8,
    ) -> Result<CsvSample, ProcessorError> {
        CsvSample::from_path(csv_path, delimiter, self.sample_rows)
    }

    pub fn infer<M: LanguageModel + ?Sized>(
        &self,
        sample: &CsvSample,
        model: &M,
    ) -> Result<Schema, ProcessorError> {
        tracing::info!(
            "Inferring schema from {} headers and {} sample rows",
            sample.headers.len(),
            sample.rows.len()
        );
        let prompt = build_schema_prompt(sample);
        let response = model.generate(&prompt)?;
        let schema = parse_schema_response(&response)?;
        tracing::info!(
            "Inferred schema groups by column '{}'",
            schema.application_service_name
        );
        Ok(schema)
    }
}

impl Default for InferenceManager {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_ROWS)
    }
}
