use std::collections::HashMap;

use cadbom_core::{Dimensions, NATIVE_UNITS};

use crate::error::GeometryError;

/// Indexed triangle soup with identical positions welded together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl TriangleMesh {
    /// Build a mesh from triangles given by corner positions.
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [[f32; 3]; 3]>,
    {
        let mut mesh = TriangleMesh::default();
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();

        for triangle in triangles {
            for corner in triangle {
                let index = *lookup.entry(weld_key(corner)).or_insert_with(|| {
                    mesh.positions.push(corner);
                    (mesh.positions.len() - 1) as u32
                });
                mesh.indices.push(index);
            }
        }

        mesh
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }

    /// Every undirected edge is shared by exactly two triangles.
    pub fn is_watertight(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
        for t in self.indices.chunks_exact(3) {
            for i in 0..3 {
                let (a, b) = (t[i], t[(i + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges.values().all(|&count| count == 2)
    }

    /// Enclosed volume via the divergence theorem; `None` for open meshes.
    pub fn volume(&self) -> Option<f64> {
        if !self.is_watertight() {
            return None;
        }
        let signed: f64 = self
            .triangles()
            .map(|[a, b, c]| {
                let (a, b, c) = (to_f64(a), to_f64(b), to_f64(c));
                dot(a, cross(b, c)) / 6.0
            })
            .sum();
        Some(signed.abs())
    }
}

/// Bounding-box extents and volume of a tessellated model.
pub fn compute_dimensions(mesh: &TriangleMesh) -> Result<Dimensions, GeometryError> {
    let (lo, hi) = mesh
        .bounds()
        .filter(|_| !mesh.is_empty())
        .ok_or(GeometryError::EmptyMesh)?;

    Ok(Dimensions {
        length: f64::from(hi[0]) - f64::from(lo[0]),
        width: f64::from(hi[1]) - f64::from(lo[1]),
        height: f64::from(hi[2]) - f64::from(lo[2]),
        volume: mesh.volume(),
        units: NATIVE_UNITS.to_string(),
    })
}

fn weld_key(p: [f32; 3]) -> [u32; 3] {
    // Adding 0.0 folds -0.0 into +0.0 so both weld together.
    [(p[0] + 0.0).to_bits(), (p[1] + 0.0).to_bits(), (p[2] + 0.0).to_bits()]
}

fn to_f64(p: [f32; 3]) -> [f64; 3] {
    [f64::from(p[0]), f64::from(p[1]), f64::from(p[2])]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Closed axis-aligned cube with one corner at `origin`, outward winding.
#[cfg(test)]
pub(crate) fn cube(origin: [f32; 3], edge: f32) -> TriangleMesh {
    let [x, y, z] = origin;
    let v = |i: usize| -> [f32; 3] {
        [
            x + if i & 1 != 0 { edge } else { 0.0 },
            y + if i & 2 != 0 { edge } else { 0.0 },
            z + if i & 4 != 0 { edge } else { 0.0 },
        ]
    };
    const FACES: [[usize; 3]; 12] = [
        [0, 2, 1], [1, 2, 3], // z = 0
        [4, 5, 6], [5, 7, 6], // z = edge
        [0, 1, 4], [1, 5, 4], // y = 0
        [2, 6, 3], [3, 6, 7], // y = edge
        [0, 4, 2], [2, 4, 6], // x = 0
        [1, 3, 5], [3, 7, 5], // x = edge
    ];
    TriangleMesh::from_triangles(FACES.iter().map(|f| [v(f[0]), v(f[1]), v(f[2])]))
}
