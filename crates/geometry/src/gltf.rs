//! glTF 2.0 scene export with an embedded base64 buffer.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::error::GeometryError;
use crate::mesh::TriangleMesh;

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const MODE_TRIANGLES: u32 = 4;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: Asset,
    scene: usize,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    buffers: Vec<Buffer>,
}

#[derive(Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Serialize)]
struct Scene {
    nodes: Vec<usize>,
}

#[derive(Serialize)]
struct Node {
    mesh: usize,
}

#[derive(Serialize)]
struct Mesh {
    primitives: Vec<Primitive>,
}

#[derive(Serialize)]
struct Primitive {
    attributes: Attributes,
    indices: usize,
    mode: u32,
}

#[derive(Serialize)]
struct Attributes {
    #[serde(rename = "POSITION")]
    position: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<[f32; 3]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    target: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    byte_length: usize,
    uri: String,
}

/// Build the glTF document for `mesh` without touching disk.
pub fn to_document(mesh: &TriangleMesh) -> Result<Value, GeometryError> {
    let (min, max) = mesh
        .bounds()
        .filter(|_| !mesh.is_empty())
        .ok_or(GeometryError::EmptyMesh)?;

    let mut bytes = Vec::with_capacity(mesh.vertex_count() * 12 + mesh.indices().len() * 4);
    for p in mesh.positions() {
        for c in p {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bytes.len();
    for i in mesh.indices() {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    let indices_len = bytes.len() - positions_len;

    let document = Document {
        asset: Asset {
            version: "2.0",
            generator: concat!("cadbom ", env!("CARGO_PKG_VERSION")),
        },
        scene: 0,
        scenes: vec![Scene { nodes: vec![0] }],
        nodes: vec![Node { mesh: 0 }],
        meshes: vec![Mesh {
            primitives: vec![Primitive {
                attributes: Attributes { position: 0 },
                indices: 1,
                mode: MODE_TRIANGLES,
            }],
        }],
        accessors: vec![
            Accessor {
                buffer_view: 0,
                component_type: COMPONENT_FLOAT,
                count: mesh.vertex_count(),
                kind: "VEC3",
                min: Some(min),
                max: Some(max),
            },
            Accessor {
                buffer_view: 1,
                component_type: COMPONENT_UNSIGNED_INT,
                count: mesh.indices().len(),
                kind: "SCALAR",
                min: None,
                max: None,
            },
        ],
        buffer_views: vec![
            BufferView {
                buffer: 0,
                byte_offset: 0,
                byte_length: positions_len,
                target: ARRAY_BUFFER,
            },
            BufferView {
                buffer: 0,
                byte_offset: positions_len,
                byte_length: indices_len,
                target: ELEMENT_ARRAY_BUFFER,
            },
        ],
        buffers: vec![Buffer {
            byte_length: bytes.len(),
            uri: format!(
                "data:application/octet-stream;base64,{}",
                general_purpose::STANDARD.encode(&bytes)
            ),
        }],
    };

    Ok(serde_json::to_value(document)?)
}

/// Write the scene to `path` and return the document as read back from it.
pub fn export_gltf(mesh: &TriangleMesh, path: &Path) -> Result<Value, GeometryError> {
    let document = to_document(mesh)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &document)?;
    writer.flush()?;
    drop(writer);

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
