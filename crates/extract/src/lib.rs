//! Best-effort STEP header sniffing.
//!
//! This is not a conformant ISO 10303-21 parser. Four independent patterns
//! are run against the top of the file and the first match of each wins.
//! A field whose pattern does not match stays `None`; nothing here fails.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::LazyLock;

use cadbom_core::StepMetadata;
use regex::Regex;
use tracing::{debug, warn};

/// Characters scanned for header entities.
pub const HEADER_WINDOW_CHARS: usize = 10_000;

/// Characters of raw header handed to the AI prompt builder.
pub const PROMPT_HEADER_CHARS: usize = 5_000;

/// `FILE_NAME('<name>', ... ('<author>'), ('<organization>')`.
/// Only single-element author and organization lists match.
static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FILE_NAME\s*\(\s*'([^']*)'.*?\('([^']*)'\)\s*,\s*\('([^']*)'\)")
        .expect("FILE_NAME pattern is valid")
});

static FILE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FILE_DESCRIPTION\s*\(\s*\('([^']*)'\)").expect("FILE_DESCRIPTION pattern is valid")
});

/// `PRODUCT('<id>', ... '<name>'`: id feeds part_number, name feeds part_name.
static PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PRODUCT\s*\(\s*'([^']*)'.*?'([^']*)'").expect("PRODUCT pattern is valid")
});

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})'").expect("timestamp pattern is valid")
});

/// Extract header metadata from the file at `path`.
///
/// Read failures are logged and produce an all-`None` record.
pub fn extract_step_metadata(path: &Path) -> StepMetadata {
    match read_prefix(path, HEADER_WINDOW_CHARS) {
        Ok(text) => {
            let metadata = extract_from_text(&text);
            debug!(path = %path.display(), empty = metadata.is_empty(), "header sniffed");
            metadata
        }
        Err(e) => {
            warn!("Metadata extraction warning for {}: {}", path.display(), e);
            StepMetadata::default()
        }
    }
}

/// Raw header text for prompt context, or `None` if the file can't be read.
pub fn header_text(path: &Path, max_chars: usize) -> Option<String> {
    match read_prefix(path, max_chars) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Error reading STEP content from {}: {}", path.display(), e);
            None
        }
    }
}

/// Apply the header patterns to an in-memory text window.
pub fn extract_from_text(text: &str) -> StepMetadata {
    let mut metadata = StepMetadata::default();

    if let Some(caps) = FILE_NAME.captures(text) {
        metadata.part_name = Some(caps[1].to_string());
        metadata.author = Some(caps[2].to_string());
        metadata.organization = Some(caps[3].to_string());
    }

    if let Some(caps) = FILE_DESCRIPTION.captures(text) {
        metadata.description = Some(caps[1].to_string());
    }

    // Product data is a fallback only; it never overrides FILE_NAME.
    if let Some(caps) = PRODUCT.captures(text) {
        if metadata.part_number.is_none() {
            metadata.part_number = Some(caps[1].to_string());
        }
        if metadata.part_name.is_none() {
            metadata.part_name = Some(caps[2].to_string());
        }
    }

    if let Some(caps) = TIMESTAMP.captures(text) {
        metadata.timestamp = Some(caps[1].to_string());
    }

    metadata
}

/// Read at most `max_chars` characters, replacing undecodable bytes.
fn read_prefix(path: &Path, max_chars: usize) -> io::Result<String> {
    // A char is at most 4 bytes in UTF-8.
    let mut bytes = Vec::with_capacity(max_chars.min(64 * 1024));
    File::open(path)?
        .take((max_chars as u64).saturating_mul(4))
        .read_to_end(&mut bytes)?;

    let text = String::from_utf8_lossy(&bytes);
    Ok(match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.into_owned(),
    })
}
