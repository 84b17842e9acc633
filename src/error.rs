use std::collections::TryReserveError;

/// Errors raised while building or copying a network.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The allocator refused a buffer request
    #[error("failed to allocate a buffer of {len} values")]
    Allocation {
        len: usize,
        #[source]
        source: TryReserveError,
    },

    /// A layer size that the lane layout cannot hold
    #[error("layer {layer} has size {size}, expected a positive multiple of 4")]
    InvalidLayerSize { layer: usize, size: usize },
}
