//! STL reading and the intermediate tessellation writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::GeometryError;
use crate::mesh::TriangleMesh;

/// Read an ASCII or binary STL file.
pub fn read_stl(path: &Path) -> Result<TriangleMesh, GeometryError> {
    let mut file = File::open(path)?;
    let stl = stl_io::read_stl(&mut file).map_err(|e| GeometryError::Stl(e.to_string()))?;

    let triangles = stl.faces.iter().map(|face| {
        [
            stl.vertices[face.vertices[0]].0,
            stl.vertices[face.vertices[1]].0,
            stl.vertices[face.vertices[2]].0,
        ]
    });
    let mesh = TriangleMesh::from_triangles(triangles);

    if mesh.is_empty() {
        return Err(GeometryError::EmptyMesh);
    }
    Ok(mesh)
}

/// Write `mesh` as binary STL with per-face normals.
pub fn write_stl(mesh: &TriangleMesh, path: &Path) -> Result<(), GeometryError> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles()
        .map(|[a, b, c]| stl_io::Triangle {
            normal: stl_io::Normal::new(face_normal(a, b, c)),
            vertices: [
                stl_io::Vertex::new(a),
                stl_io::Vertex::new(b),
                stl_io::Vertex::new(c),
            ],
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    stl_io::write_stl(&mut writer, triangles.iter())?;
    writer.flush()?;
    Ok(())
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}
