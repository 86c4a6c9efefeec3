use rig2d::{TextureHandle, TextureUploader};
use std::collections::HashMap;

use crate::renderer::TextureBindings;

/// wgpu side of the texture cache bridge.
///
/// Decodes atlas page images, uploads them as single-mip textures and
/// hands back opaque handles for the cache to store. Also resolves those
/// handles back to bind groups at draw time. Handles start at 1 so the
/// null handle never aliases a live texture.
pub struct WgpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bind_groups: HashMap<TextureHandle, wgpu::BindGroup>,
    next: u64,
}

impl WgpuTextures {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("rig2d atlas sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            layout: layout.clone(),
            sampler,
            bind_groups: HashMap::new(),
            next: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.bind_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bind_groups.is_empty()
    }
}

impl TextureUploader for WgpuTextures {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Option<TextureHandle> {
        let img = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("failed to decode atlas page '{path}': {e}");
                return None;
            }
        };

        let (width, height) = (img.width(), img.height());
        // Grayscale pages stay single-channel; everything else (RGB
        // included, wgpu has no 3-channel format) expands to RGBA.
        let (format, pixels, bytes_per_row) = match img {
            image::DynamicImage::ImageLuma8(gray) => {
                (wgpu::TextureFormat::R8Unorm, gray.into_raw(), width)
            }
            other => (
                wgpu::TextureFormat::Rgba8UnormSrgb,
                other.to_rgba8().into_raw(),
                4 * width,
            ),
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(path),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(path),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let handle = TextureHandle(self.next);
        self.next += 1;
        self.bind_groups.insert(handle, bind_group);
        Some(handle)
    }
}

impl TextureBindings for WgpuTextures {
    fn bind_group_for(&self, texture: TextureHandle) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(&texture)
    }
}
