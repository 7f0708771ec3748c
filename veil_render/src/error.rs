// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Errors from texture creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureError<E> {
    /// The size is not a power of two and the device supports neither
    /// non-power-of-two 2D textures nor rectangle textures.
    Unsupported {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// The device failed.
    Device(E),
}

impl<E: fmt::Debug> fmt::Display for TextureError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { width, height } => write!(
                f,
                "cannot create a {width}x{height} texture: non-power-of-two or rectangle texture support is required"
            ),
            Self::Device(e) => write!(f, "texture device error: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for TextureError<E> {}
