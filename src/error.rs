//! Error type shared by the math, scene and rendering layers

use crate::scene::NodeId;

/// Everything that can go wrong while building or rendering a scene
#[derive(Debug)]
pub enum Error {
    /// Inverse requested for a matrix whose determinant is (nearly) zero
    SingularMatrix,
    /// Normalizing a vector of length zero
    ZeroLengthVector,
    /// Pixel or buffer access outside the target bounds
    IndexOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// Geometry attribute layout does not match what the pipeline consumes
    InvalidAttributeLayout {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
    /// Reparenting would make a node its own ancestor
    CyclicHierarchy { parent: NodeId, child: NodeId },
    UnknownNode(NodeId),
    NotACamera(NodeId),
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ImageError(image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

impl From<ron::error::SpannedError> for Error {
    fn from(e: ron::error::SpannedError) -> Self {
        Error::ParseError(e)
    }
}

impl From<ron::Error> for Error {
    fn from(e: ron::Error) -> Self {
        Error::SerializeError(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::ImageError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SingularMatrix => write!(f, "matrix is singular and has no inverse"),
            Error::ZeroLengthVector => write!(f, "cannot normalize a zero-length vector"),
            Error::IndexOutOfRange { x, y, width, height } => {
                write!(f, "pixel ({}, {}) is outside the {}x{} target", x, y, width, height)
            }
            Error::InvalidAttributeLayout { attribute, expected, found } => write!(
                f,
                "invalid layout for {}: expected {}, found {}",
                attribute, expected, found
            ),
            Error::CyclicHierarchy { parent, child } => write!(
                f,
                "cannot add node {} under node {}: it is an ancestor",
                child.index(),
                parent.index()
            ),
            Error::UnknownNode(id) => write!(f, "unknown scene node {}", id.index()),
            Error::NotACamera(id) => write!(f, "scene node {} is not a camera", id.index()),
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError(e) => write!(f, "Parse error: {}", e),
            Error::SerializeError(e) => write!(f, "Serialize error: {}", e),
            Error::ImageError(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::ParseError(e) => Some(e),
            Error::SerializeError(e) => Some(e),
            Error::ImageError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_range() {
        let e = Error::IndexOutOfRange { x: 9, y: 2, width: 4, height: 4 };
        assert_eq!(e.to_string(), "pixel (9, 2) is outside the 4x4 target");
    }

    #[test]
    fn test_io_error_has_source() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(std::error::Error::source(&e).is_some());
    }
}
