//! Error type shared by every module of the crate.

use thiserror::Error;

use crate::layers::dense::LayerState;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, NnError>;

#[derive(Error, Debug)]
pub enum NnError {
    /// Operand dimensions violate an operation's precondition.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// An operation was called out of order for the layer's current state.
    #[error("cannot {op} while layer is {state:?}")]
    InvalidStateTransition { op: &'static str, state: LayerState },

    /// Sizes or learning rate rejected at construction.
    #[error("invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Self {
        NnError::ShapeMismatch { op, left, right }
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, NnError::ShapeMismatch { .. })
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, NnError::InvalidStateTransition { .. })
    }

    pub fn is_invalid_construction(&self) -> bool {
        matches!(self, NnError::InvalidConstruction(_))
    }
}
