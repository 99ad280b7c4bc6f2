use std::convert::Infallible;

use thiserror::Error;

/// Why a dispatch did not run every slot
#[derive(Error, Debug)]
pub enum EmitError<E = Infallible> {
    #[error("signal emitted from within one of its own slots")]
    Reentrant,
    #[error("slot at position {position} failed")]
    Slot {
        position: usize,
        #[source]
        source: E,
    },
}

impl<E> EmitError<E> {
    /// The error returned by the failing slot, if that is why the dispatch stopped
    pub fn into_source(self) -> Option<E> {
        match self {
            EmitError::Reentrant => None,
            EmitError::Slot { source, .. } => Some(source),
        }
    }
}
