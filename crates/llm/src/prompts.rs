//! Prompt templates for part analysis and BOM consolidation.

use serde_json::Value;

use crate::analysis::FileSummary;

/// Characters of raw STEP header embedded in the part prompt.
pub const PROMPT_HEADER_LIMIT: usize = 3_000;

const PART_RESPONSE_SCHEMA: &str = r#"
Please provide a structured JSON response with the following fields:
{
  "part_name": "Best guess for part name",
  "part_number": "Part number if identifiable, or suggest format",
  "description": "Brief description of the part",
  "category": "Part category (e.g., mechanical, electronic, fastener)",
  "material": "Suggested material based on context",
  "quantity": 1,
  "estimated_cost": null,
  "manufacturer": "Manufacturer if identifiable",
  "notes": "Any additional relevant information",
  "confidence": "high/medium/low - how confident you are in this data"
}

Make reasonable inferences based on:
- Filename patterns
- Dimension ranges (e.g., small parts might be fasteners)
- Common CAD naming conventions
- Industry standards

Return ONLY valid JSON, no additional text.
"#;

const BOM_RESPONSE_SCHEMA: &str = r#"

Generate a complete BOM in JSON format with the following structure:
{
  "bom_name": "Suggested BOM name based on parts",
  "total_parts": number,
  "parts": [
    {
      "line_number": 1,
      "part_number": "PN-XXX",
      "part_name": "Name",
      "description": "Description",
      "quantity": 1,
      "category": "Category",
      "material": "Material",
      "manufacturer": "Manufacturer or TBD",
      "estimated_cost": null,
      "notes": "Notes"
    }
  ],
  "assembly_notes": "Overall notes about the assembly",
  "missing_information": ["List of data that needs manual entry"]
}

Rules:
- Assign sequential line numbers
- Suggest part numbers if not available (format: PN-001, PN-002, etc.)
- Group similar parts (e.g., if multiple identical fasteners, combine with quantity)
- Flag duplicate or similar parts
- Identify common hardware (screws, nuts, washers) by dimensions
- Suggest materials based on typical use cases
- List what information is missing or uncertain

Return ONLY valid JSON.
"#;

/// Single-part analysis prompt.
pub fn part_prompt(file: &FileSummary) -> String {
    let mut prompt = format!(
        "Analyze this CAD file and extract structured BOM data.\n\n\
         File name: {}\n\
         File type: {}\n\n\
         Extracted metadata:\n{}\n\n\
         Physical dimensions:\n{}\n\n",
        file.filename,
        file.file_type,
        pretty(file.metadata_json()),
        pretty(file.dimensions_json()),
    );

    if let Some(content) = file.step_content.as_deref().filter(|c| !c.is_empty()) {
        let header: String = content.chars().take(PROMPT_HEADER_LIMIT).collect();
        prompt.push_str(&format!("\nSTEP file header content:\n```\n{header}\n```\n"));
    }

    prompt.push_str(PART_RESPONSE_SCHEMA);
    prompt
}

/// Consolidated BOM prompt over every successfully processed file.
pub fn bom_prompt(files: &[FileSummary]) -> String {
    let mut prompt = format!(
        "You are analyzing {} CAD files to generate a Bill of Materials (BOM).\n\nFiles analyzed:\n",
        files.len()
    );

    for (i, file) in files.iter().enumerate() {
        prompt.push_str(&format!(
            "\n{}. {}\n   Type: {}\n   Dimensions: {}\n   Metadata: {}\n",
            i + 1,
            file.filename,
            file.file_type,
            file.dimensions_json(),
            file.metadata_json(),
        ));
    }

    prompt.push_str(BOM_RESPONSE_SCHEMA);
    prompt
}

fn pretty(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
