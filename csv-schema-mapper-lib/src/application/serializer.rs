use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::ProcessorError;
use crate::types::ServiceGroup;

pub struct OutputSerializer;

impl OutputSerializer {
    /// Pretty JSON with two-space indentation, no trailing newline.
    pub fn to_bytes(document: &[ServiceGroup]) -> Result<Vec<u8>, ProcessorError> {
        Ok(serde_json::to_vec_pretty(document)?)
    }

    /// Serializes the whole document first, then hands it to `writer` in a
    /// single write.
    pub fn write_to<W: Write>(
        document: &[ServiceGroup],
        writer: &mut W,
    ) -> Result<(), ProcessorError> {
        let bytes = Self::to_bytes(document)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes to a uniquely named sibling temp file and renames it over
    /// `output_path`, so the target either holds the complete document or is
    /// left untouched.
    pub fn save(document: &[ServiceGroup], output_path: &Path) -> Result<(), ProcessorError> {
        let bytes = Self::to_bytes(document)?;

        let dir = match output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let file_name = output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.json".to_string());

        // Dropped (and removed) on any early return
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".partial")
            .tempfile_in(dir)?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        temp.persist(output_path).map_err(|e| {
            tracing::error!("Failed to move output into {}: {}", output_path.display(), e);
            e.error
        })?;

        tracing::info!(
            "Saved {} service groups to {}",
            document.len(),
            output_path.display()
        );
        Ok(())
    }
}
