use std::io::Read;
use std::sync::Arc;

use super::grouping::GroupedResult;
use crate::error::ProcessorError;
use crate::reader::ChunkedReader;
use crate::schema::Schema;
use crate::types::{AttributeKey, Row, ServiceMapping};

/// Counters reported after a full pass over the CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationSummary {
    pub rows: u64,
    pub chunks: u64,
    pub groups: usize,
    pub mappings: usize,
}

pub struct ServiceMappingProcessor {
    schema: Arc<Schema>,
    grouped: GroupedResult,
    rows: u64,
    chunks: u64,
}

impl ServiceMappingProcessor {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            grouped: GroupedResult::new(),
            rows: 0,
            chunks: 0,
        }
    }

    /// Resolves one row against the mapping template.
    ///
    /// Returns the row's service name alongside its mapping. Attributes whose
    /// column is unset or absent from the row come out as `""`.
    pub fn map_row<'r>(&self, row: &'r Row) -> Result<(&'r str, ServiceMapping), ProcessorError> {
        let service_column = &self.schema.application_service_name;
        let service_name = row.get(service_column).ok_or_else(|| {
            let context = match row.line() {
                Some(line) => format!("row at line {} has no service name cell", line),
                None => "row has no service name cell".to_string(),
            };
            ProcessorError::missing_column(service_column, context)
        })?;

        let template = self.schema.template()?;
        let mut mapping = ServiceMapping::default();
        for key in AttributeKey::ALL {
            let column = template.column(key);
            if column.is_empty() {
                continue;
            }
            if let Some(value) = row.get(column) {
                mapping.set(key, value);
            }
        }

        Ok((service_name, mapping))
    }

    pub fn process_chunk(&mut self, rows: &[Row]) -> Result<(), ProcessorError> {
        for row in rows {
            let (service_name, mapping) = self.map_row(row)?;
            self.grouped.push(service_name, mapping);
        }
        self.rows += rows.len() as u64;
        self.chunks += 1;
        tracing::debug!(
            "Processed chunk {} ({} rows, {} groups so far)",
            self.chunks,
            rows.len(),
            self.grouped.group_count()
        );
        Ok(())
    }

    /// Drains every chunk from `reader`, strictly in source order.
    pub fn process_reader<R: Read>(
        &mut self,
        mut reader: ChunkedReader<R>,
    ) -> Result<(), ProcessorError> {
        while let Some(chunk) = reader.next_chunk()? {
            self.process_chunk(&chunk)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            rows: self.rows,
            chunks: self.chunks,
            groups: self.grouped.group_count(),
            mappings: self.grouped.mapping_count(),
        }
    }

    pub fn into_grouped(self) -> GroupedResult {
        self.grouped
    }
}
