use thiserror::Error;

use crate::geometry::elliptic::TransformError;
use crate::math::mathieu::MathieuError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("at least one element must be defined")]
    NoElements,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("element {element} is a {kind} element, which has no geometry setup")]
    UnsupportedElement { element: usize, kind: &'static str },

    #[error("geometry setup failed for element {element}: {reason}")]
    Geometry { element: usize, reason: String },

    #[error(
        "collocation point {collocation_index} of element {source_element} \
         cannot be expressed in the frame of element {influencing_element}"
    )]
    CollocationDomain {
        source_element: usize,
        influencing_element: usize,
        collocation_index: usize,
        #[source]
        source: TransformError,
    },

    #[error("point ({x}, {y}) cannot be expressed in the frame of element {element}")]
    FieldDomain {
        x: f64,
        y: f64,
        element: usize,
        #[source]
        source: TransformError,
    },

    #[error("Mathieu basis unavailable for element {element}")]
    Basis {
        element: usize,
        #[source]
        source: MathieuError,
    },

    #[error("least-squares solve failed: {0}")]
    Solve(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Element the failure is attributed to, if any.
    pub fn element(&self) -> Option<usize> {
        match self {
            Error::UnsupportedElement { element, .. }
            | Error::Geometry { element, .. }
            | Error::FieldDomain { element, .. }
            | Error::Basis { element, .. } => Some(*element),
            Error::CollocationDomain { source_element, .. } => Some(*source_element),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collocation_error_names_pair() {
        let err = Error::CollocationDomain {
            source_element: 1,
            influencing_element: 3,
            collocation_index: 7,
            source: TransformError::CoincidentWithCentre,
        };
        let msg = err.to_string();
        assert!(msg.contains("collocation point 7"));
        assert!(msg.contains("element 1"));
        assert!(msg.contains("element 3"));
        assert_eq!(err.element(), Some(1));
    }

    #[test]
    fn test_no_elements_is_unattributed() {
        assert_eq!(Error::NoElements.element(), None);
    }
}
