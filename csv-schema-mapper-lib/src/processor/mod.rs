use crate::application::{ApplicationManager, ApplicationSummary};
use crate::error::{ProcessingOutcome, ProcessorError};
use crate::inference::{build_schema_prompt, InferenceManager, DEFAULT_SAMPLE_ROWS};
use crate::model::LanguageModel;
use crate::reader::{ChunkedReader, CsvSample, DEFAULT_CHUNK_SIZE};
use crate::schema::Schema;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Rows held in memory per read. Never changes the output.
    pub chunk_size: usize,
    /// Rows shown to the model during inference.
    pub sample_rows: usize,
    pub delimiter: u8,
    /// Treat template columns missing from the header as errors.
    pub is_strict: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            sample_rows: DEFAULT_SAMPLE_ROWS,
            delimiter: b',',
            is_strict: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    config: PipelineConfig,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn sample_rows(mut self, sample_rows: usize) -> Self {
        self.config.sample_rows = sample_rows;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    pub fn strict(mut self, is_strict: bool) -> Self {
        self.config.is_strict = is_strict;
        self
    }

    pub fn build(self) -> Result<Processor, ProcessorError> {
        if self.config.chunk_size == 0 {
            return Err(ProcessorError::InvalidConfig(
                "chunk size must be at least 1".into(),
            ));
        }
        tracing::debug!("Building processor with {:?}", self.config);
        Ok(Processor {
            config: self.config,
        })
    }
}

/// Result of a full inference + application run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub schema: Schema,
    pub summary: ApplicationSummary,
}

pub struct Processor {
    config: PipelineConfig,
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn open<P: AsRef<Path>>(
        &self,
        csv_path: P,
    ) -> Result<ChunkedReader<std::fs::File>, ProcessorError> {
        ChunkedReader::from_path(csv_path, self.config.delimiter, self.config.chunk_size)
    }

    pub fn sample<P: AsRef<Path>>(&self, csv_path: P) -> Result<CsvSample, ProcessorError> {
        InferenceManager::new(self.config.sample_rows).sample(csv_path, self.config.delimiter)
    }

    /// The exact instruction that inference would send, without calling a model.
    pub fn prompt<P: AsRef<Path>>(&self, csv_path: P) -> Result<String, ProcessorError> {
        Ok(build_schema_prompt(&self.sample(csv_path)?))
    }

    pub fn infer_schema<P, M>(&self, csv_path: P, model: &M) -> Result<Schema, ProcessorError>
    where
        P: AsRef<Path>,
        M: LanguageModel + ?Sized,
    {
        let manager = InferenceManager::new(self.config.sample_rows);
        let sample = manager.sample(csv_path, self.config.delimiter)?;
        manager.infer(&sample, model)
    }

    /// Checks a schema against the CSV header without reading any rows.
    pub fn validate<P: AsRef<Path>>(
        &self,
        csv_path: P,
        schema: &Schema,
    ) -> Result<ProcessingOutcome, ProcessorError> {
        let reader = self.open(csv_path)?;
        let manager = ApplicationManager::new(Arc::new(schema.clone()), self.config.is_strict);
        manager.validate(&reader)
    }

    pub fn apply_schema<P, Q>(
        &self,
        csv_path: P,
        schema: &Schema,
        output_path: Q,
    ) -> Result<ApplicationSummary, ProcessorError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let csv_path = csv_path.as_ref();
        tracing::info!(
            "Applying schema to {} in chunks of {} rows",
            csv_path.display(),
            self.config.chunk_size
        );
        let reader = self.open(csv_path)?;
        let manager = ApplicationManager::new(Arc::new(schema.clone()), self.config.is_strict);
        manager.apply_to_path(reader, output_path.as_ref())
    }

    pub fn apply_schema_to_writer<R: Read, W: Write>(
        &self,
        source: R,
        schema: &Schema,
        writer: &mut W,
    ) -> Result<ApplicationSummary, ProcessorError> {
        let reader =
            ChunkedReader::from_reader(source, self.config.delimiter, self.config.chunk_size)?;
        let manager = ApplicationManager::new(Arc::new(schema.clone()), self.config.is_strict);
        manager.apply_to_writer(reader, writer)
    }

    /// Infers a schema with one model call, optionally saves it, then applies
    /// it to every row. A bad model response fails before any row is mapped.
    pub fn run<P, Q, M>(
        &self,
        csv_path: P,
        output_path: Q,
        model: &M,
        schema_path: Option<&Path>,
    ) -> Result<PipelineReport, ProcessorError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        M: LanguageModel + ?Sized,
    {
        let csv_path = csv_path.as_ref();
        tracing::info!("Starting pipeline for {}", csv_path.display());

        let schema = self.infer_schema(csv_path, model)?;
        if let Some(schema_path) = schema_path {
            schema.save(schema_path)?;
        }

        let summary = self.apply_schema(csv_path, &schema, output_path)?;
        tracing::info!("Pipeline completed successfully");
        Ok(PipelineReport { schema, summary })
    }
}
