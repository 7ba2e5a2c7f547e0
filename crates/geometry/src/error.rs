use cadbom_core::CadError;

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse STL: {0}")]
    Stl(String),
    #[error("failed to import STEP: {0}")]
    Step(String),
    #[error("STEP import requires the step-kernel feature")]
    KernelUnavailable,
    #[error("mesh has no triangles")]
    EmptyMesh,
    #[error("failed to serialize scene: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<GeometryError> for CadError {
    fn from(e: GeometryError) -> Self {
        CadError::Conversion(e.to_string())
    }
}
