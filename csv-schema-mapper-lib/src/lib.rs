//! CSV Service-Mapping Schema Library
//!
//! This library infers a column-to-entity mapping schema for a CSV file with a
//! single language-model call, then applies that schema to every row of the
//! file, grouping the resulting service mappings by application service.

mod application;
mod error;
mod inference;
mod model;
mod processor;
mod reader;
mod schema;
mod types;

pub use application::{
    ApplicationManager, ApplicationSummary, GroupedResult, OutputSerializer,
    ServiceMappingProcessor,
};
pub use error::{ProcessingMessage, ProcessingOutcome, ProcessingState, ProcessorError};
pub use inference::{
    build_schema_prompt, parse_schema_response, strip_code_fence, InferenceManager,
    DEFAULT_SAMPLE_ROWS,
};
pub use model::{
    ChatCompletionConfig, ChatCompletionModel, LanguageModel, ModelError, StaticModel,
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};
pub use processor::{PipelineConfig, PipelineReport, Processor, ProcessorBuilder};
pub use reader::{ChunkedReader, CsvSample, DEFAULT_CHUNK_SIZE};
pub use schema::{MappingTemplate, Schema};
pub use types::{
    AttributeKey, HeaderIndex, Row, ServiceGroup, ServiceMapping, APPLICATION_SERVICE_NAME,
    SERVICE_MAPPINGS,
};
