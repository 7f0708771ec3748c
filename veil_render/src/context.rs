// Copyright 2025 the Veil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The render context: one per compositor, created at startup.

use crate::device::{
    DeviceFeatures, PixelData, PixelFormat, RenderDevice, TextureComponents, TextureFlags,
    TextureKind, UploadPath,
};
use crate::error::TextureError;

/// Returns `true` if `x` is a positive power of two.
#[inline]
pub fn is_pot(x: i32) -> bool {
    x > 0 && (x & (x - 1)) == 0
}

/// Premultiplies an RGBA color, rounding to nearest.
pub fn premultiply(red: u8, green: u8, blue: u8, alpha: u8) -> [u8; 4] {
    let scale = |c: u8| -> u8 {
        let v = (u32::from(c) * u32::from(alpha) + 127) / 255;
        // v <= 255 since both factors are <= 255.
        u8::try_from(v).unwrap_or(u8::MAX)
    };
    [scale(red), scale(green), scale(blue), alpha]
}

/// Chooses the storage kind for a new texture of the given size.
///
/// Returns `None` when the size cannot be represented on this device.
pub fn select_texture_kind(features: DeviceFeatures, width: i32, height: i32) -> Option<TextureKind> {
    if (is_pot(width) && is_pot(height)) || features.contains(DeviceFeatures::TEXTURE_NPOT) {
        Some(TextureKind::TwoD)
    } else if features.contains(DeviceFeatures::TEXTURE_RECTANGLE) {
        Some(TextureKind::Rectangle)
    } else {
        None
    }
}

/// Shared rendering state, created once and passed to whoever paints.
///
/// The texture pipeline template is built exactly once, in
/// [`RenderContext::new`]: a pipeline sampling a 1x1 opaque white texture on
/// layer 0. Every texture pipeline is a copy of it with only the layer-0
/// texture replaced, so the device can share one GPU program between them.
///
/// Device features are also queried once at construction.
#[derive(Debug)]
pub struct RenderContext<D: RenderDevice> {
    device: D,
    features: DeviceFeatures,
    texture_template: D::Pipeline,
}

impl<D: RenderDevice> RenderContext<D> {
    /// Creates the context and its pipeline template.
    pub fn new(mut device: D) -> Result<Self, TextureError<D::Error>> {
        let features = device.features();
        let dummy = upload_color(&mut device, [0xff; 4], TextureFlags::empty())?;
        let mut texture_template = device.new_pipeline();
        device.set_layer_texture(&mut texture_template, 0, &dummy);
        log::debug!("render context ready, features {features:?}");
        Ok(Self {
            device,
            features,
            texture_template,
        })
    }

    /// The underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The underlying device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Device features captured at construction.
    pub fn features(&self) -> DeviceFeatures {
        self.features
    }

    /// Returns `true` if 2D textures may have any size.
    pub fn supports_npot(&self) -> bool {
        self.features.contains(DeviceFeatures::TEXTURE_NPOT)
    }

    /// Creates a pipeline for painting `src` (or the white dummy when `None`).
    pub fn texture_pipeline(&mut self, src: Option<&D::Texture>) -> D::Pipeline {
        let mut pipeline = self.device.copy_pipeline(&self.texture_template);
        if let Some(texture) = src {
            self.device.set_layer_texture(&mut pipeline, 0, texture);
        }
        pipeline
    }

    /// Creates a 1x1 texture of a solid color.
    ///
    /// The color is given unpremultiplied and stored premultiplied.
    pub fn create_color_texture(
        &mut self,
        red: u8,
        green: u8,
        blue: u8,
        alpha: u8,
        flags: TextureFlags,
    ) -> Result<D::Texture, TextureError<D::Error>> {
        upload_color(&mut self.device, [red, green, blue, alpha], flags)
    }

    /// Creates an empty texture.
    ///
    /// When the size is not a power of two and the device lacks NPOT support,
    /// a rectangle texture is used instead, if available. With
    /// [`TextureFlags::ALLOW_SLICING`], storage is allocated immediately and an
    /// allocation failure falls back to a sliced texture.
    pub fn create_texture(
        &mut self,
        width: i32,
        height: i32,
        components: TextureComponents,
        flags: TextureFlags,
    ) -> Result<D::Texture, TextureError<D::Error>> {
        let kind = select_texture_kind(self.features, width, height)
            .ok_or(TextureError::Unsupported { width, height })?;
        let texture = self.device.new_texture(kind, width, height);
        self.device.set_components(&texture, components);

        if !flags.contains(TextureFlags::ALLOW_SLICING) {
            return Ok(texture);
        }
        match self.device.allocate(&texture) {
            Ok(()) => Ok(texture),
            Err(err) => {
                log::debug!("{width}x{height} {kind:?} texture allocation failed ({err:?}), slicing");
                drop(texture);
                let sliced = self.device.new_texture(TextureKind::Sliced, width, height);
                self.device.set_components(&sliced, components);
                Ok(sliced)
            }
        }
    }

    /// Creates a texture from pixel data.
    ///
    /// Uses a plain 2D texture when the device supports NPOT sizes, otherwise
    /// the device's legacy constructor, which honors `flags`.
    pub fn create_texture_from_data(
        &mut self,
        pixels: &PixelData<'_>,
        flags: TextureFlags,
        internal_format: PixelFormat,
    ) -> Result<D::Texture, TextureError<D::Error>> {
        let path = self.upload_path(flags, internal_format);
        self.device.upload(path, pixels).map_err(TextureError::Device)
    }

    /// Creates an empty texture of the given size.
    ///
    /// Like [`RenderContext::create_texture_from_data`], a plain 2D texture
    /// is used when the device supports NPOT sizes, otherwise the device's
    /// legacy constructor, which honors `flags` and `internal_format`.
    pub fn create_texture_with_size(
        &mut self,
        width: i32,
        height: i32,
        flags: TextureFlags,
        internal_format: PixelFormat,
    ) -> Result<D::Texture, TextureError<D::Error>> {
        self.device
            .new_texture_with_size(self.upload_path(flags, internal_format), width, height)
            .map_err(TextureError::Device)
    }

    fn upload_path(&self, flags: TextureFlags, internal_format: PixelFormat) -> UploadPath {
        if self.supports_npot() {
            UploadPath::TwoD
        } else {
            UploadPath::Legacy {
                flags,
                internal_format,
            }
        }
    }
}

fn upload_color<D: RenderDevice>(
    device: &mut D,
    [red, green, blue, alpha]: [u8; 4],
    flags: TextureFlags,
) -> Result<D::Texture, TextureError<D::Error>> {
    let pixel = premultiply(red, green, blue, alpha);
    let pixels = PixelData {
        width: 1,
        height: 1,
        format: PixelFormat::Rgba8888Pre,
        rowstride: 4,
        data: &pixel,
    };
    device
        .upload(
            UploadPath::Legacy {
                flags,
                internal_format: PixelFormat::Any,
            },
            &pixels,
        )
        .map_err(TextureError::Device)
}
