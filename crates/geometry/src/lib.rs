//! Mesh import, measurement, and scene export for the conversion pipeline.
//!
//! STL is read directly. STEP goes through the optional `step-kernel`
//! feature, which parses the B-rep and tessellates every shell.

pub mod error;
pub mod gltf;
pub mod mesh;
pub mod step;
pub mod stl;

use std::path::Path;

use cadbom_core::FileFormat;

pub use error::GeometryError;
pub use gltf::export_gltf;
pub use mesh::{compute_dimensions, TriangleMesh};
pub use step::kernel_available;
pub use stl::write_stl;

/// Import a model and return its triangle mesh.
///
/// STL input is already tessellated; STEP input is tessellated on import.
pub fn import_model(path: &Path, format: FileFormat) -> Result<TriangleMesh, GeometryError> {
    let mesh = match format {
        FileFormat::Stl => stl::read_stl(path)?,
        FileFormat::Step | FileFormat::Stp => step::import_step(path)?,
    };
    tracing::debug!(
        path = %path.display(),
        format = %format,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "model imported"
    );
    Ok(mesh)
}
