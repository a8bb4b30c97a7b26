use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use csv_schema_mapper::{
    ChatCompletionConfig, ChatCompletionModel, LanguageModel, ProcessingOutcome, Processor,
    Schema, StaticModel, DEFAULT_CHUNK_SIZE, DEFAULT_ENDPOINT, DEFAULT_SAMPLE_ROWS,
    DEFAULT_TIMEOUT_SECS,
};
use std::{fs, path::PathBuf, time::Duration};
use template::{Template, ANNOTATED_SCHEMA, BLANK_SCHEMA};
use tracing::{info, warn, Level};

mod template;

/// CSV Service-Mapping Schema Tool
/// Infers a service-mapping schema for a CSV with a language model and applies it to every row
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output for detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CsvArgs {
    /// Path to the input CSV file
    #[arg(short, long, value_name = "PATH TO CSV")]
    input: PathBuf,

    /// Field delimiter of the input CSV
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// OpenAI-compatible chat completions endpoint
    #[arg(long, env = "LLM_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model name passed to the endpoint
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Bearer token for the endpoint
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout for the model call, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Use a saved model response instead of calling the endpoint
    #[arg(long, value_name = "PATH TO RESPONSE")]
    response_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer a schema with one model call and apply it to the whole CSV
    Run {
        #[command(flatten)]
        csv: CsvArgs,

        /// Output path for the grouped JSON document
        #[arg(short, long, value_name = "OUTPUT PATH")]
        output: PathBuf,

        /// Also save the inferred schema for reuse with `apply`
        #[arg(long, value_name = "SCHEMA PATH")]
        save_schema: Option<PathBuf>,

        /// Rows read into memory at a time
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Rows shown to the model
        #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
        sample_rows: usize,

        /// Fail if a mapped column is missing from the CSV headers
        #[arg(short, long)]
        strict: bool,

        #[command(flatten)]
        model: ModelArgs,
    },
    /// Infer a schema and write it to a file without applying it
    Infer {
        #[command(flatten)]
        csv: CsvArgs,

        /// Output path for the inferred schema
        #[arg(short, long, value_name = "SCHEMA PATH")]
        output: PathBuf,

        /// Rows shown to the model
        #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
        sample_rows: usize,

        #[command(flatten)]
        model: ModelArgs,
    },
    /// Apply an existing schema to the whole CSV
    Apply {
        #[command(flatten)]
        csv: CsvArgs,

        /// Path to the schema file
        #[arg(long, value_name = "SCHEMA PATH")]
        schema: PathBuf,

        /// Output path for the grouped JSON document
        #[arg(short, long, value_name = "OUTPUT PATH")]
        output: PathBuf,

        /// Rows read into memory at a time
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Fail if a mapped column is missing from the CSV headers
        #[arg(short, long)]
        strict: bool,
    },
    /// Check a schema against the headers of a CSV
    Validate {
        #[command(flatten)]
        csv: CsvArgs,

        /// Path to the schema file
        #[arg(long, value_name = "SCHEMA PATH")]
        schema: PathBuf,

        /// Fail if a mapped column is missing from the CSV headers
        #[arg(short, long)]
        strict: bool,
    },
    /// Print the inference prompt for a CSV without calling a model
    Prompt {
        #[command(flatten)]
        csv: CsvArgs,

        /// Rows shown to the model
        #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
        sample_rows: usize,
    },
    /// Generate a schema template to fill in by hand
    GenerateSchema {
        /// Type of schema template to generate (blank/annotated)
        #[arg(short = 't', long = "type", default_value = "annotated")]
        template_type: String,

        /// Output path for the generated schema
        #[arg(short, long, default_value = "schema.jsonc", value_name = "OUTPUT PATH")]
        output: PathBuf,
    },
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            if bytes.len() == 1 {
                Ok(bytes[0])
            } else {
                Err(format!(
                    "delimiter must be a single ASCII character, got '{}'",
                    value
                ))
            }
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    info!("CSV service-mapping schema tool starting up...");

    match cli.command {
        Commands::Run {
            csv,
            output,
            save_schema,
            chunk_size,
            sample_rows,
            strict,
            model,
        } => run_command(&csv, &output, save_schema, chunk_size, sample_rows, strict, &model),
        Commands::Infer {
            csv,
            output,
            sample_rows,
            model,
        } => infer_command(&csv, &output, sample_rows, &model),
        Commands::Apply {
            csv,
            schema,
            output,
            chunk_size,
            strict,
        } => apply_command(&csv, &schema, &output, chunk_size, strict),
        Commands::Validate {
            csv,
            schema,
            strict,
        } => validate_command(&csv, &schema, strict),
        Commands::Prompt { csv, sample_rows } => prompt_command(&csv, sample_rows),
        Commands::GenerateSchema {
            template_type,
            output,
        } => generate_schema_command(&template_type, &output),
    }
}

/// A saved response takes precedence over any configured endpoint.
fn build_model(args: &ModelArgs) -> Result<Box<dyn LanguageModel>> {
    if let Some(response_file) = &args.response_file {
        let model = StaticModel::from_file(response_file).context(format!(
            "Failed to read model response: {}",
            response_file.display()
        ))?;
        return Ok(Box::new(model));
    }

    let model_name = args.model.clone().ok_or_else(|| {
        anyhow::anyhow!("No model configured. Pass --model, set LLM_MODEL, or use --response-file")
    })?;
    let mut config = ChatCompletionConfig::new(model_name);
    config.endpoint = args.endpoint.clone();
    config.api_key = args.api_key.clone();
    config.timeout = Duration::from_secs(args.timeout_secs);

    let model = ChatCompletionModel::new(config).context("Failed to create model client")?;
    Ok(Box::new(model))
}

fn require_input(csv: &CsvArgs) -> Result<()> {
    if !csv.input.exists() {
        anyhow::bail!(
            "CSV file not found: {}. Try using --input <PATH TO CSV>",
            csv.input.display()
        );
    }
    Ok(())
}

fn load_schema(schema_path: &PathBuf) -> Result<Schema> {
    if !schema_path.exists() {
        anyhow::bail!("Schema file not found: {}", schema_path.display());
    }
    Schema::from_file(schema_path)
        .context("Failed to load schema. See errors for additional details:")
}

fn run_command(
    csv: &CsvArgs,
    output: &PathBuf,
    save_schema: Option<PathBuf>,
    chunk_size: usize,
    sample_rows: usize,
    strict: bool,
    model_args: &ModelArgs,
) -> Result<()> {
    if strict {
        info!("Running in strict mode");
    }
    require_input(csv)?;
    let model = build_model(model_args)?;

    let processor = Processor::builder()
        .chunk_size(chunk_size)
        .sample_rows(sample_rows)
        .delimiter(csv.delimiter)
        .strict(strict)
        .build()
        .context("Invalid processing options")?;

    let report = processor
        .run(&csv.input, output, model.as_ref(), save_schema.as_deref())
        .context("Failed to process CSV file")?;

    info!(
        "Wrote {} mappings across {} service groups to {}",
        report.summary.mappings,
        report.summary.groups,
        output.display()
    );
    Ok(())
}

fn infer_command(
    csv: &CsvArgs,
    output: &PathBuf,
    sample_rows: usize,
    model_args: &ModelArgs,
) -> Result<()> {
    require_input(csv)?;
    let model = build_model(model_args)?;

    let processor = Processor::builder()
        .sample_rows(sample_rows)
        .delimiter(csv.delimiter)
        .build()?;

    let schema = processor
        .infer_schema(&csv.input, model.as_ref())
        .context("Failed to infer schema")?;
    schema
        .save(output)
        .context(format!("Failed to write schema to: {}", output.display()))?;

    info!("Successfully wrote inferred schema to: {}", output.display());
    Ok(())
}

fn apply_command(
    csv: &CsvArgs,
    schema_path: &PathBuf,
    output: &PathBuf,
    chunk_size: usize,
    strict: bool,
) -> Result<()> {
    if strict {
        info!("Running in strict mode");
    }
    require_input(csv)?;
    let schema = load_schema(schema_path)?;

    let processor = Processor::builder()
        .chunk_size(chunk_size)
        .delimiter(csv.delimiter)
        .strict(strict)
        .build()
        .context("Invalid processing options")?;

    info!("Beginning CSV processing...");
    let summary = processor
        .apply_schema(&csv.input, &schema, output)
        .context("Failed to apply schema")?;

    info!(
        "Processed {} rows into {} service groups",
        summary.rows, summary.groups
    );
    Ok(())
}

fn validate_command(csv: &CsvArgs, schema_path: &PathBuf, strict: bool) -> Result<()> {
    info!("Validating schema...");
    require_input(csv)?;
    let schema = load_schema(schema_path)?;

    let processor = Processor::builder()
        .delimiter(csv.delimiter)
        .strict(strict)
        .build()?;

    match processor
        .validate(&csv.input, &schema)
        .context("Failed to validate schema")?
    {
        ProcessingOutcome::Success => info!("Schema validation successful"),
        ProcessingOutcome::SuccessWithWarnings(warnings) => {
            for warning in &warnings {
                warn!(
                    "{}: {}",
                    warning.source.as_deref().unwrap_or("schema"),
                    warning.message
                );
            }
            info!(
                "Schema validation successful with {} warning(s)",
                warnings.len()
            );
        }
        ProcessingOutcome::Failure { errors, warnings } => {
            for warning in &warnings {
                warn!(
                    "{}: {}",
                    warning.source.as_deref().unwrap_or("schema"),
                    warning.message
                );
            }
            for error in &errors {
                tracing::error!(
                    "{}: {}",
                    error.source.as_deref().unwrap_or("schema"),
                    error.message
                );
            }
            anyhow::bail!("Schema validation failed with {} error(s)", errors.len());
        }
    }
    info!("Service name column: {}", schema.application_service_name);
    Ok(())
}

fn prompt_command(csv: &CsvArgs, sample_rows: usize) -> Result<()> {
    require_input(csv)?;
    let processor = Processor::builder()
        .sample_rows(sample_rows)
        .delimiter(csv.delimiter)
        .build()?;
    let prompt = processor
        .prompt(&csv.input)
        .context("Failed to build prompt")?;
    println!("{}", prompt);
    Ok(())
}

fn generate_schema_command(template_type: &str, output: &PathBuf) -> Result<()> {
    let template = match template_type.to_lowercase().as_str() {
        "blank" => Template::Blank,
        "annotated" => Template::Annotated,
        _ => anyhow::bail!("Invalid template type. Must be either 'blank' or 'annotated'"),
    };

    info!("Generating {} schema template...", template_type);

    let template_content = match template {
        Template::Blank => BLANK_SCHEMA,
        Template::Annotated => ANNOTATED_SCHEMA,
    };

    // if output is a directory, append the default file name
    let full_file_output_path = if output.is_dir() {
        output.join("schema.jsonc")
    } else {
        output.into()
    };

    fs::write(&full_file_output_path, template_content)
        .context(format!("Failed to write schema to: {}", output.display()))?;

    info!(
        "Successfully generated schema template at: {}",
        full_file_output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
