//! Output generation for catalog documents.
//!
//! The document is written twice: as plain JSON, and bound to a variable in
//! a script the visualization can load with a `<script>` tag. Both carry the
//! same JSON text.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{JSON_OUTPUT_FILE, SCRIPT_OUTPUT_FILE, SCRIPT_VARIABLE};
use crate::error::{CatalogError, Result};
use crate::types::CatalogDocument;

/// Paths of the files written by [`save_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: PathBuf,
    pub script: PathBuf,
}

/// Serialize a document to compact JSON.
pub fn render_json(document: &CatalogDocument) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Wrap JSON text in a variable declaration.
///
/// ```
/// use scf_catalog::output::render_script;
///
/// assert_eq!(render_script("{}"), "const scfData = {};");
/// ```
#[must_use]
pub fn render_script(json: &str) -> String {
    format!("const {SCRIPT_VARIABLE} = {json};")
}

/// Slice out the JSON object embedded in a script wrapper.
///
/// Takes everything from the first `{` to the last `}`.
///
/// ```
/// use scf_catalog::output::extract_payload;
///
/// assert_eq!(extract_payload("const a = {\"b\": {}};"), Some("{\"b\": {}}"));
/// assert_eq!(extract_payload("const a = 1;"), None);
/// ```
#[must_use]
pub fn extract_payload(script: &str) -> Option<&str> {
    let start = script.find('{')?;
    let end = script.rfind('}')?;
    if end < start {
        return None;
    }
    script.get(start..=end)
}

/// Hidden sibling path a file is staged at before it is renamed into place.
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Write and sync `content` to `temp_file`.
fn stage(temp_file: &Path, content: &str) -> Result<()> {
    let mut file = File::create(temp_file)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

/// Move a staged file over its destination.
fn commit(temp_file: &Path, path: &Path) -> Result<()> {
    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(temp_file, path)?;
    Ok(())
}

/// Remove staged files that are still on disk.
fn discard(temp_files: &[&Path]) {
    for temp_file in temp_files {
        if temp_file.is_file() {
            if let Err(e) = fs::remove_file(temp_file) {
                warn!(path = %temp_file.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

/// Save a document as `scf_data.json` and `scf_data.js` in `output_dir`.
///
/// Both files are staged and synced before either destination is replaced.
/// The JSON document is moved into place first; a failure there leaves the
/// existing script untouched. Staged files are removed on any failure.
pub fn save_outputs(document: &CatalogDocument, output_dir: &Path) -> Result<OutputPaths> {
    let json = render_json(document)?;
    let script = render_script(&json);

    let paths = OutputPaths {
        json: output_dir.join(JSON_OUTPUT_FILE),
        script: output_dir.join(SCRIPT_OUTPUT_FILE),
    };
    let json_temp = temp_path(&paths.json);
    let script_temp = temp_path(&paths.script);

    let result = stage(&script_temp, &script)
        .and_then(|()| stage(&json_temp, &json))
        .and_then(|()| commit(&json_temp, &paths.json))
        .and_then(|()| commit(&script_temp, &paths.script));

    if let Err(e) = result {
        discard(&[&json_temp, &script_temp]);
        return Err(e);
    }

    info!(path = %paths.script.display(), "Wrote script document");
    info!(path = %paths.json.display(), "Wrote JSON document");
    Ok(paths)
}

/// Read the embedded JSON text of a script wrapper file.
pub fn read_script_payload(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    extract_payload(&content)
        .map(String::from)
        .ok_or_else(|| CatalogError::MissingPayload(path.display().to_string()))
}

/// Load a document from a script wrapper file.
pub fn load_script(path: &Path) -> Result<CatalogDocument> {
    Ok(serde_json::from_str(&read_script_payload(path)?)?)
}

/// Load a document from a plain JSON file.
pub fn load_json(path: &Path) -> Result<CatalogDocument> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
