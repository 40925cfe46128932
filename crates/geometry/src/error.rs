//! Result and Error types for critmc-geometry

/// Type alias for Result<T, geometry::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `critmc-geometry` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("vtkio error")]
    VtkioError(#[from] vtkio::Error),

    #[error("degenerate boundary on {axis} axis (min={min}, max={max})")]
    DegenerateBoundary { axis: String, min: f64, max: f64 },

    #[error("cell pitch on {axis} axis must be finite and positive (found {pitch})")]
    InvalidPitch { axis: String, pitch: f64 },

    #[error("pitch {pitch} does not divide the {axis} axis width {width} into whole cells")]
    PitchMismatch {
        axis: String,
        pitch: f64,
        width: f64,
    },

    #[error("material has {found} groups but the mesh expects {expected}")]
    GroupMismatch { expected: usize, found: usize },

    #[error("position ({x}, {y}, {z}) is outside of the mesh")]
    PositionOutOfBounds { x: f64, y: f64, z: f64 },

    #[error("cell {cell} is outside of the mesh dimensions {dims:?}")]
    CellOutOfBounds { cell: String, dims: [usize; 3] },

    #[error("flux arrays differ in shape (expected {expected:?}, found {found:?})")]
    FluxShapeMismatch {
        expected: [usize; 4],
        found: [usize; 4],
    },
}
