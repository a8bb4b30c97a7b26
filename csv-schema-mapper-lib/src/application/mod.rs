mod grouping;
mod processor;
mod serializer;

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

pub use grouping::GroupedResult;
pub use processor::{ApplicationSummary, ServiceMappingProcessor};
pub use serializer::OutputSerializer;

use crate::error::{ProcessingOutcome, ProcessorError};
use crate::reader::ChunkedReader;
use crate::schema::Schema;

/// Runs the deterministic half of the pipeline: stream, map, group, write.
pub struct ApplicationManager {
    schema: Arc<Schema>,
    is_strict: bool,
}

impl ApplicationManager {
    pub fn new(schema: Arc<Schema>, is_strict: bool) -> Self {
        Self { schema, is_strict }
    }

    /// Checks the schema against the reader's header before any row is mapped.
    pub fn validate<R: Read>(
        &self,
        reader: &ChunkedReader<R>,
    ) -> Result<ProcessingOutcome, ProcessorError> {
        let state = self
            .schema
            .validate_headers(reader.headers(), self.is_strict)?;
        Ok(ProcessingOutcome::from_state(state))
    }

    /// Maps every row and returns the grouped result without writing it.
    pub fn group<R: Read>(
        &self,
        reader: ChunkedReader<R>,
    ) -> Result<(GroupedResult, ApplicationSummary), ProcessorError> {
        match self.validate(&reader)? {
            ProcessingOutcome::Success => {}
            ProcessingOutcome::SuccessWithWarnings(warnings) => {
                tracing::warn!(
                    "Schema validated with {} warning(s); unmatched attributes will be empty",
                    warnings.len()
                );
            }
            ProcessingOutcome::Failure { errors, .. } => {
                tracing::error!("Schema validation failed with {} error(s)", errors.len());
                let missing = self.schema.missing_template_columns(reader.headers())?;
                if let Some((key, column)) = missing.into_iter().next() {
                    return Err(ProcessorError::missing_column(
                        column,
                        format!("{} is not a CSV header", key),
                    ));
                }
            }
        }

        let mut processor = ServiceMappingProcessor::new(Arc::clone(&self.schema));
        processor.process_reader(reader)?;
        let summary = processor.summary();
        tracing::info!(
            "Mapped {} rows in {} chunk(s) into {} service group(s)",
            summary.rows,
            summary.chunks,
            summary.groups
        );
        Ok((processor.into_grouped(), summary))
    }

    pub fn apply_to_writer<R: Read, W: Write>(
        &self,
        reader: ChunkedReader<R>,
        writer: &mut W,
    ) -> Result<ApplicationSummary, ProcessorError> {
        let (grouped, summary) = self.group(reader)?;
        OutputSerializer::write_to(&grouped.into_document(), writer)?;
        Ok(summary)
    }

    pub fn apply_to_path<R: Read>(
        &self,
        reader: ChunkedReader<R>,
        output_path: &Path,
    ) -> Result<ApplicationSummary, ProcessorError> {
        let (grouped, summary) = self.group(reader)?;
        OutputSerializer::save(&grouped.into_document(), output_path)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MappingTemplate;
    use crate::types::AttributeKey;

    const CSV: &str = "app,db_col\nA,d1\nB,d2\n";

    fn manager(is_strict: bool) -> ApplicationManager {
        let schema = Schema::new(
            "app",
            MappingTemplate::default()
                .with_column(AttributeKey::DbCiName, "db_col")
                .with_column(AttributeKey::ServerCiName, "srv_col")
                .with_column(AttributeKey::LoadBalancer, "lb_col"),
        );
        ApplicationManager::new(Arc::new(schema), is_strict)
    }

    fn reader() -> ChunkedReader<&'static [u8]> {
        ChunkedReader::from_reader(CSV.as_bytes(), b',', 10).unwrap()
    }

    #[test]
    fn test_strict_validate_collects_all_errors() {
        match manager(true).validate(&reader()).unwrap() {
            ProcessingOutcome::Failure { errors, warnings } => {
                assert!(warnings.is_empty());
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].source.as_deref(), Some("SERVER_CI_NAME"));
                assert_eq!(errors[1].source.as_deref(), Some("LOAD_BALANCER"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_lenient_validate_warns() {
        match manager(false).validate(&reader()).unwrap() {
            ProcessingOutcome::SuccessWithWarnings(warnings) => assert_eq!(warnings.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_strict_apply_fails_on_first_missing_column() {
        let mut out = Vec::new();
        let err = manager(true)
            .apply_to_writer(reader(), &mut out)
            .unwrap_err();
        assert!(
            matches!(err, ProcessorError::MissingColumn { ref column, .. } if column == "srv_col")
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_lenient_apply_leaves_missing_attributes_empty() {
        let mut out = Vec::new();
        let summary = manager(false).apply_to_writer(reader(), &mut out).unwrap();
        assert_eq!(summary.rows, 2);
        let document: Vec<crate::types::ServiceGroup> = serde_json::from_slice(&out).unwrap();
        assert_eq!(document[0].service_mappings[0].db_ci_name, "d1");
        assert_eq!(document[0].service_mappings[0].load_balancer, "");
    }
}
