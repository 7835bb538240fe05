//! Array-specific error types.

use std::convert::Infallible;
use std::error::Error;
use std::fmt;

/// Errors that can occur while allocating storage or constructing elements.
///
/// `E` is the error type of a caller-supplied fallible constructor. It
/// defaults to [`Infallible`] for operations that only allocate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError<E = Infallible> {
    /// The requested slot count, or its size in bytes, cannot be represented.
    CapacityOverflow {
        /// Number of slots requested, saturated at `usize::MAX` when the
        /// count itself overflowed.
        requested: usize,
    },
    /// The global allocator could not satisfy the request.
    AllocFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
        /// Alignment of the failed request in bytes.
        align: usize,
    },
    /// The caller's constructor for an element returned an error.
    Construct(E),
}

impl ArrayError {
    /// Widen an allocation-only error so it can carry a constructor error.
    pub fn widen<E>(self) -> ArrayError<E> {
        match self {
            Self::CapacityOverflow { requested } => ArrayError::CapacityOverflow { requested },
            Self::AllocFailed { bytes, align } => ArrayError::AllocFailed { bytes, align },
            Self::Construct(never) => match never {},
        }
    }
}

impl<E> ArrayError<E> {
    /// Whether this error came from the allocator rather than the element type.
    pub fn is_alloc_error(&self) -> bool {
        !matches!(self, Self::Construct(_))
    }

    /// The constructor error, if that is what this is.
    pub fn into_construct(self) -> Option<E> {
        match self {
            Self::Construct(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for ArrayError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: cannot represent {requested} slots")
            }
            Self::AllocFailed { bytes, align } => {
                write!(
                    f,
                    "allocation failed: requested {bytes} bytes with alignment {align}"
                )
            }
            Self::Construct(e) => {
                write!(f, "element construction failed: {e}")
            }
        }
    }
}

impl<E: Error + 'static> Error for ArrayError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Construct(e) => Some(e),
            _ => None,
        }
    }
}
