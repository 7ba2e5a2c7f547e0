//! STEP solid import, available with the `step-kernel` feature.

use std::path::Path;

use crate::error::GeometryError;
use crate::mesh::TriangleMesh;

/// Whether this build can import STEP solids.
pub fn kernel_available() -> bool {
    cfg!(feature = "step-kernel")
}

#[cfg(feature = "step-kernel")]
pub fn import_step(path: &Path) -> Result<TriangleMesh, GeometryError> {
    kernel::tessellate_file(path)
}

#[cfg(not(feature = "step-kernel"))]
pub fn import_step(_path: &Path) -> Result<TriangleMesh, GeometryError> {
    Err(GeometryError::KernelUnavailable)
}

#[cfg(feature = "step-kernel")]
mod kernel {
    use std::path::Path;

    use truck_meshalgo::prelude::*;
    use truck_stepio::r#in::Table;

    use crate::error::GeometryError;
    use crate::mesh::TriangleMesh;

    /// Parse the B-rep and tessellate every shell into one mesh.
    pub fn tessellate_file(path: &Path) -> Result<TriangleMesh, GeometryError> {
        let raw = std::fs::read_to_string(path)?;
        let exchange = ruststep::parser::parse(&raw)
            .map_err(|e| GeometryError::Step(format!("failed to parse STEP file: {e}")))?;
        let data = exchange
            .data
            .first()
            .ok_or_else(|| GeometryError::Step("STEP file has no data sections".into()))?;
        let table = Table::from_data_section(data);

        let mut shells: Vec<_> = table.shell.iter().collect();
        if shells.is_empty() {
            return Err(GeometryError::Step("no shells found in STEP file".into()));
        }
        shells.sort_by_key(|(id, _)| **id);

        let mut triangles: Vec<[[f32; 3]; 3]> = Vec::new();
        for (id, holder) in shells {
            let compressed = table.to_compressed_shell(holder).map_err(|e| {
                GeometryError::Step(format!("failed to convert shell #{id} into topology: {e}"))
            })?;

            // Coarse pass sizes the tolerance relative to the part.
            let coarse = compressed.robust_triangulation(0.01).to_polygon();
            let mut tol = coarse.bounding_box().diameter() * 0.001;
            if !tol.is_normal() {
                tol = 0.01;
            }

            let polygon = compressed.robust_triangulation(tol).to_polygon();
            collect_triangles(&polygon, &mut triangles);
        }

        tracing::debug!(triangles = triangles.len(), "STEP shells tessellated");
        Ok(TriangleMesh::from_triangles(triangles))
    }

    fn collect_triangles(polygon: &PolygonMesh, out: &mut Vec<[[f32; 3]; 3]>) {
        let positions = polygon.positions();
        let point = |i: usize| -> [f32; 3] {
            let p = positions[i];
            [p.x as f32, p.y as f32, p.z as f32]
        };

        for tri in polygon.tri_faces() {
            out.push([point(tri[0].pos), point(tri[1].pos), point(tri[2].pos)]);
        }
        for quad in polygon.quad_faces() {
            out.push([point(quad[0].pos), point(quad[1].pos), point(quad[2].pos)]);
            out.push([point(quad[0].pos), point(quad[2].pos), point(quad[3].pos)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "step-kernel"))]
    #[test]
    fn import_without_kernel_is_a_clear_error() {
        assert!(!kernel_available());
        let err = import_step(Path::new("part.step")).unwrap_err();
        assert_eq!(err.to_string(), "STEP import requires the step-kernel feature");
    }
}
