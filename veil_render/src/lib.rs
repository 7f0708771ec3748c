// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Veil Render: the compositor's explicit render context.
//!
//! Scene nodes reference textures and pipelines but never create them. This
//! crate owns that setup:
//!
//! - [`RenderDevice`]: the seam to a GPU texture/pipeline library.
//! - [`RenderContext`]: created once at startup and passed by reference. It
//!   queries device features once and builds the shared texture pipeline
//!   template eagerly, so there is no hidden global state.
//! - Texture fallback selection ([`select_texture_kind`]): non-power-of-two
//!   sizes use rectangle textures on devices without NPOT support, and
//!   [`TextureFlags::ALLOW_SLICING`] falls back to sliced storage when a single
//!   texture cannot be allocated.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod device;
mod error;

pub use context::{RenderContext, is_pot, premultiply, select_texture_kind};
pub use device::{
    DeviceFeatures, PixelData, PixelFormat, RenderDevice, TextureComponents, TextureFlags,
    TextureKind, UploadPath,
};
pub use error::TextureError;
