use std::ffi::c_int;

use thiserror::Error;
use usb_descriptor::InvalidEndpoint;

/// Failure reported by a [`Runtime`](crate::Runtime) primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("cannot allocate a descriptor array of length {len}")]
    ArrayAllocation { len: usize },
    #[error("cannot allocate a descriptor object")]
    ObjectAllocation,
    #[error("index {index} is out of bounds for an array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl RuntimeError {
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::ArrayAllocation { .. } | Self::ObjectAllocation)
    }
}

/// Why a single descriptor could not be marshalled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    #[error(transparent)]
    Copy(#[from] InvalidEndpoint),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Error returned by the marshaller.
///
/// A marshal call either returns a fully populated array or exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("native descriptor count {count} is negative")]
    NegativeCount { count: c_int },

    #[error("{count} descriptors exceed the configured maximum of {max}")]
    TooManyDescriptors { count: usize, max: usize },

    #[error("descriptor {index}: {length} extra bytes exceed the configured maximum of {max}")]
    ExtraTooLong {
        index: usize,
        length: usize,
        max: usize,
    },

    /// The output array itself could not be allocated.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("descriptor {index}: {source}")]
    Element { index: usize, source: ElementError },
}

impl Error {
    pub(crate) fn element(index: usize, source: impl Into<ElementError>) -> Self {
        Self::Element {
            index,
            source: source.into(),
        }
    }

    /// Whether the runtime or the allocator ran out of resources, as opposed to the native
    /// input being unusable.
    pub fn is_resource_exhaustion(&self) -> bool {
        match self {
            Self::Runtime(e) | Self::Element {
                source: ElementError::Runtime(e),
                ..
            } => e.is_resource_exhaustion(),
            Self::Element {
                source: ElementError::Copy(InvalidEndpoint::ExtraAllocation { .. }),
                ..
            } => true,
            _ => false,
        }
    }

    /// Index of the descriptor that failed, if the failure is tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::ExtraTooLong { index, .. } | Self::Element { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
