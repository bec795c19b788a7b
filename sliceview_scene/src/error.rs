// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

use crate::ids::{LayerId, TransformId, ViewId};

/// Errors from scene operations.
///
/// Lookups of missing participants are recoverable: a caller addressing a
/// single id gets the error back, while fan-out paths skip the missing
/// participant with a warning and keep going.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// The addressed view is not registered in this scene.
    #[error("no {0} in this scene")]
    ViewNotFound(ViewId),
    /// The addressed transform is not registered in this scene.
    #[error("no {0} in this scene")]
    TransformNotFound(TransformId),
    /// The addressed layer is not registered in this scene.
    #[error("no {0} in this scene")]
    LayerNotFound(LayerId),
    /// Malformed numeric input; the operation was rejected and no state
    /// changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The frame buffer for a reshape could not be allocated.
    #[error("failed to allocate a {width}x{height} frame buffer")]
    BufferAllocation {
        /// Requested buffer width in pixels.
        width: u32,
        /// Requested buffer height in pixels.
        height: u32,
    },
}
