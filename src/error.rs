use thiserror::Error;

/// Errors raised while setting up or writing out a render.
///
/// Nothing inside the per-sample hot path returns one of these: numerical
/// anomalies during tracing propagate into the pixel average instead.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot normalize a zero-length vector ({context})")]
    DegenerateVector { context: &'static str },

    #[error("sphere {sphere} references material {index}, but the scene has {count} materials")]
    MissingMaterial {
        sphere: usize,
        index: usize,
        count: usize,
    },

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("samples per pixel must be at least 1")]
    InvalidSampling,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
