//! CLI argument parsing and the offline subcommands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cadbom_core::FileFormat;
use clap::{Parser, Subcommand};
use tracing::info;

/// CAD conversion and BOM service.
#[derive(Parser, Debug)]
#[command(name = "cadbom-server", version, about = "CAD to glTF conversion service with AI-assisted BOMs")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Print the STEP header metadata of a local file as JSON
    Extract {
        path: PathBuf,
    },
    /// Convert a local file to glTF and print its dimensions
    Convert {
        path: PathBuf,
        /// Source format; inferred from the extension when omitted
        #[arg(long)]
        format: Option<String>,
        /// Where to write the glTF document (default: next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

pub fn extract(path: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(path.is_file(), "{} is not a file", path.display());
    let metadata = cadbom_extract::extract_step_metadata(path);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

pub fn convert(path: &Path, format: Option<&str>, output: Option<&Path>) -> anyhow::Result<()> {
    let declared = match format {
        Some(f) => f.to_string(),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string)
            .with_context(|| format!("cannot infer format of {}; pass --format", path.display()))?,
    };
    let format = FileFormat::parse(&declared)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.with_extension("gltf"));

    let mesh = cadbom_geometry::import_model(path, format)?;
    let dimensions = cadbom_geometry::compute_dimensions(&mesh)?;
    cadbom_geometry::export_gltf(&mesh, &output)?;

    info!(
        triangles = mesh.triangle_count(),
        output = %output.display(),
        "Wrote glTF"
    );
    println!("{}", serde_json::to_string_pretty(&dimensions)?);
    Ok(())
}
