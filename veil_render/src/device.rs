// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPU device seam: what the render context needs from a texture and
//! pipeline library.

use core::fmt::Debug;

bitflags::bitflags! {
    /// Optional capabilities reported by a [`RenderDevice`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DeviceFeatures: u32 {
        /// 2D textures may have non-power-of-two sizes.
        const TEXTURE_NPOT      = 0b0000_0001;
        /// Rectangle textures (unnormalized coordinates, any size) are available.
        const TEXTURE_RECTANGLE = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Creation flags for textures.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// The texture may be split into several hardware textures when a
        /// single one of the requested size cannot be allocated.
        const ALLOW_SLICING = 0b0000_0001;
        /// Do not generate mipmaps automatically.
        const NO_AUTO_MIPMAP = 0b0000_0010;
    }
}

/// Storage flavor of a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A regular 2D texture.
    TwoD,
    /// A rectangle texture, used when NPOT 2D textures are unavailable.
    Rectangle,
    /// A texture sliced over several hardware textures.
    Sliced,
}

/// Which channels a texture stores.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureComponents {
    /// Alpha only.
    A,
    /// Red and green.
    Rg,
    /// Red, green and blue.
    Rgb,
    /// Red, green, blue and alpha.
    #[default]
    Rgba,
    /// Depth.
    Depth,
}

/// Layout of pixel data uploaded to a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Let the device choose.
    Any,
    /// 8 bits per channel, RGBA order, premultiplied alpha.
    Rgba8888Pre,
    /// 8 bits per channel, BGRA order, premultiplied alpha.
    Bgra8888Pre,
}

/// Pixel data to upload.
#[derive(Copy, Clone, Debug)]
pub struct PixelData<'a> {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Layout of `data`.
    pub format: PixelFormat,
    /// Bytes per row.
    pub rowstride: usize,
    /// The pixels.
    pub data: &'a [u8],
}

/// How [`RenderDevice::upload`] and [`RenderDevice::new_texture_with_size`]
/// should create the texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UploadPath {
    /// Create a plain 2D texture; the device supports NPOT sizes.
    TwoD,
    /// Use the device's legacy constructor, which picks storage itself
    /// according to `flags` and converts to `internal_format`.
    Legacy {
        /// Creation flags.
        flags: TextureFlags,
        /// Requested internal format.
        internal_format: PixelFormat,
    },
}

/// A texture and pipeline library.
///
/// The compositor does not create GPU objects itself; it asks a device.
/// Texture creation is lazy: [`RenderDevice::new_texture`] only describes the
/// texture, and storage is allocated on first use or by an explicit
/// [`RenderDevice::allocate`].
pub trait RenderDevice {
    /// Texture handle. Dropping the last handle releases the texture.
    type Texture: Clone + Debug;
    /// Pipeline handle.
    type Pipeline: Debug;
    /// Device error.
    type Error: Debug;

    /// Capabilities of this device.
    fn features(&self) -> DeviceFeatures;

    /// Describes a texture of the given kind and size without allocating it.
    fn new_texture(&mut self, kind: TextureKind, width: i32, height: i32) -> Self::Texture;

    /// Sets which channels `texture` stores.
    fn set_components(&mut self, texture: &Self::Texture, components: TextureComponents);

    /// Forces storage for `texture` to be allocated.
    fn allocate(&mut self, texture: &Self::Texture) -> Result<(), Self::Error>;

    /// Creates a texture holding `pixels`.
    fn upload(
        &mut self,
        path: UploadPath,
        pixels: &PixelData<'_>,
    ) -> Result<Self::Texture, Self::Error>;

    /// Creates an empty texture of the given size through `path`.
    ///
    /// Unlike [`RenderDevice::new_texture`], the legacy path lets the device
    /// pick the storage kind itself.
    fn new_texture_with_size(
        &mut self,
        path: UploadPath,
        width: i32,
        height: i32,
    ) -> Result<Self::Texture, Self::Error>;

    /// Creates an empty pipeline.
    fn new_pipeline(&mut self) -> Self::Pipeline;

    /// Copies a pipeline. Copies of one parent may share GPU programs.
    fn copy_pipeline(&mut self, pipeline: &Self::Pipeline) -> Self::Pipeline;

    /// Samples `texture` on `layer` of `pipeline`.
    fn set_layer_texture(&mut self, pipeline: &mut Self::Pipeline, layer: u32, texture: &Self::Texture);
}
