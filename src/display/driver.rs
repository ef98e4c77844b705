// Presentation driver - streaming frame texture on a window surface
//
// Owns the GPU side of the pipeline: a frame texture padded to
// power-of-two dimensions, a CPU-mappable transfer buffer the converter
// writes into, and the render pass that samples the texture into the
// output rectangle. The transfer buffer map/unmap is the per-frame
// synchronization point between the conversion workers and the GPU copy.

use std::sync::Arc;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler, Surface,
    SurfaceConfiguration, Texture,
};
use winit::window::Window;

use crate::config::PresenterConfig;
use crate::filter::{ConvertOptions, FrameConverter, Zoom};
use crate::framebuffer::{IndexedFramebuffer, VISIBLE_HEIGHT, VISIBLE_WIDTH};
use crate::palette::ColorTable;
use crate::viewport::{Rect, ScalingMode, Viewport};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Frame texture width at 1x, power-of-two padded above the visible width
pub const FRAME_TEXTURE_WIDTH: u32 = 1024;

/// Frame texture height at 1x, power-of-two padded above the visible height
pub const FRAME_TEXTURE_HEIGHT: u32 = 512;

/// GPU presentation driver for the converted frame
///
/// Holds the window surface, the streaming frame texture, and the
/// transfer buffer, recreating the streaming pair when the zoom factor
/// changes. `present` is the only per-frame entry point.
pub struct PresentDriver {
    device: Device,
    queue: Queue,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    nearest_sampler: Sampler,
    linear_sampler: Sampler,
    texture: Texture,
    nearest_bind_group: BindGroup,
    linear_bind_group: BindGroup,
    transfer_buffer: Buffer,
    uniform_buffer: Buffer,
    zoom: Zoom,
    converter: FrameConverter<u32>,
    viewport: Viewport,
    hq_supported: bool,
}

impl PresentDriver {
    /// Create a driver for a window
    ///
    /// Fails when no adapter can host the 1x frame texture. When the
    /// adapter cannot host the 2x texture, HQ stretch is disabled and the
    /// driver falls back to aspect fit for that mode.
    pub fn new(window: Arc<Window>, config: &PresenterConfig) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| format!("Failed to find appropriate adapter: {:?}", e))?;

        let max_dim = adapter.limits().max_texture_dimension_2d;
        if max_dim < FRAME_TEXTURE_WIDTH {
            return Err(format!(
                "Adapter texture limit {} cannot host the {}x{} frame texture",
                max_dim, FRAME_TEXTURE_WIDTH, FRAME_TEXTURE_HEIGHT
            )
            .into());
        }
        let hq_supported = max_dim >= FRAME_TEXTURE_WIDTH * 2;
        if !hq_supported {
            log::warn!(
                "Adapter texture limit {} too small for 2x streaming, HQ stretch disabled",
                max_dim
            );
        }

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                label: Some("Present Driver Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            }))
            .map_err(|e| format!("Failed to create device: {:?}", e))?;

        // Palette colors are raw values, so prefer a non-sRGB surface to
        // avoid a second transfer curve on scanout
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.video.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let (pipeline, bind_group_layout) = Self::create_pipeline(&device, surface_format);

        // Minification always linear; magnification is what the scaling
        // modes differ on
        let nearest_sampler = Self::create_sampler(&device, wgpu::FilterMode::Nearest);
        let linear_sampler = Self::create_sampler(&device, wgpu::FilterMode::Linear);

        let zoom = zoom_for_mode(effective_mode(config.video.scaling, hq_supported));

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let texture = Self::create_frame_texture(&device, zoom);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let nearest_bind_group = Self::create_bind_group(
            &device,
            &bind_group_layout,
            &texture_view,
            &nearest_sampler,
            &uniform_buffer,
        );
        let linear_bind_group = Self::create_bind_group(
            &device,
            &bind_group_layout,
            &texture_view,
            &linear_sampler,
            &uniform_buffer,
        );
        let transfer_buffer = Self::create_transfer_buffer(&device, zoom);

        log::info!(
            "Presentation driver ready: {:?} surface, {}x{} frame texture, {} workers",
            surface_format,
            FRAME_TEXTURE_WIDTH * zoom.factor() as u32,
            FRAME_TEXTURE_HEIGHT * zoom.factor() as u32,
            config.effective_workers()
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            pipeline,
            bind_group_layout,
            nearest_sampler,
            linear_sampler,
            texture,
            nearest_bind_group,
            linear_bind_group,
            transfer_buffer,
            uniform_buffer,
            zoom,
            converter: FrameConverter::new(config.effective_workers()),
            viewport: Viewport::new(),
            hq_supported,
        })
    }

    /// Whether the adapter can host the 2x frame texture
    pub fn hq_supported(&self) -> bool {
        self.hq_supported
    }

    /// Resize the window surface
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.viewport.request_clear();
    }

    /// Convert and present one frame
    ///
    /// Maps the transfer buffer, runs the converter into it, copies the
    /// zoomed visible region into the frame texture and draws it into the
    /// output rectangle. A lost or outdated surface reconfigures and skips
    /// the frame; a timeout just skips it.
    pub fn present(
        &mut self,
        fb: &IndexedFramebuffer,
        table: &ColorTable,
        mode: ScalingMode,
        filter_dithering: bool,
    ) -> Result<()> {
        let mode = effective_mode(mode, self.hq_supported);
        let zoom = zoom_for_mode(mode);
        if zoom != self.zoom {
            self.recreate_stream_resources(zoom);
        }

        self.viewport
            .update(self.surface_config.width, self.surface_config.height, mode);

        self.fill_transfer_buffer(fb, table, filter_dithering)?;

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                self.viewport.request_clear();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(format!("Surface error: {:?}", e).into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let factor = self.zoom.factor() as u32;
        let upload_width = VISIBLE_WIDTH as u32 * factor;
        let upload_height = VISIBLE_HEIGHT as u32 * factor;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &self.transfer_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * upload_width),
                    rows_per_image: Some(upload_height),
                },
            },
            self.texture.as_image_copy(),
            wgpu::Extent3d {
                width: upload_width,
                height: upload_height,
                depth_or_array_layers: 1,
            },
        );

        // A viewport cannot extend past the surface, so when the window is
        // smaller than the output rect the crop happens in texture space:
        // shrink the sampled UV window to the centered portion that fits.
        let rect = self.viewport.rect();
        let clamped = clamp_to_surface(rect, self.surface_config.width, self.surface_config.height);
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&uv_window(rect, clamped)),
        );

        let load = if self.viewport.take_clear() {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if clamped.width == 0 || clamped.height == 0 {
                drop(render_pass);
                self.queue.submit(Some(encoder.finish()));
                surface_texture.present();
                return Ok(());
            }
            render_pass.set_viewport(
                clamped.x as f32,
                clamped.y as f32,
                clamped.width as f32,
                clamped.height as f32,
                0.0,
                1.0,
            );

            render_pass.set_pipeline(&self.pipeline);
            let bind_group = match mag_filter_for(mode) {
                wgpu::FilterMode::Nearest => &self.nearest_bind_group,
                _ => &self.linear_bind_group,
            };
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(Some(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    /// Convert the frame at 1x into a plain buffer, for screenshots
    pub fn capture_frame(
        &mut self,
        fb: &IndexedFramebuffer,
        table: &ColorTable,
        filter_dithering: bool,
    ) -> Vec<u32> {
        let mut out = vec![0u32; VISIBLE_WIDTH * VISIBLE_HEIGHT];
        self.converter.convert_frame(
            fb,
            table,
            &mut out,
            ConvertOptions {
                filter_dithering,
                zoom: Zoom::X1,
            },
        );
        out
    }

    /// Map the transfer buffer and convert the frame into it
    fn fill_transfer_buffer(
        &mut self,
        fb: &IndexedFramebuffer,
        table: &ColorTable,
        filter_dithering: bool,
    ) -> Result<()> {
        let buffer_slice = self.transfer_buffer.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Write, move |result| {
            sender.send(result).ok();
        });

        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .ok();

        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(format!("Transfer buffer mapping failed: {:?}", e).into()),
            Err(_) => return Err("Channel closed before mapping completed".into()),
        }

        {
            let mut view = buffer_slice.get_mapped_range_mut();
            let pixels: &mut [u32] = bytemuck::cast_slice_mut(&mut view[..]);
            self.converter.convert_frame(
                fb,
                table,
                pixels,
                ConvertOptions {
                    filter_dithering,
                    zoom: self.zoom,
                },
            );
        }
        self.transfer_buffer.unmap();

        Ok(())
    }

    /// Recreate the frame texture and transfer buffer for a new zoom
    ///
    /// The single create/destroy path for the streaming pair; bind groups
    /// follow the texture.
    fn recreate_stream_resources(&mut self, zoom: Zoom) {
        log::debug!(
            "Recreating stream resources at {}x zoom",
            zoom.factor()
        );

        self.texture.destroy();
        self.transfer_buffer.destroy();

        self.texture = Self::create_frame_texture(&self.device, zoom);
        let texture_view = self.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.nearest_bind_group = Self::create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &texture_view,
            &self.nearest_sampler,
            &self.uniform_buffer,
        );
        self.linear_bind_group = Self::create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &texture_view,
            &self.linear_sampler,
            &self.uniform_buffer,
        );
        self.transfer_buffer = Self::create_transfer_buffer(&self.device, zoom);

        self.zoom = zoom;
        self.viewport.request_clear();
    }

    /// Create the streaming frame texture for a zoom factor
    fn create_frame_texture(device: &Device, zoom: Zoom) -> Texture {
        let factor = zoom.factor() as u32;
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d {
                width: FRAME_TEXTURE_WIDTH * factor,
                height: FRAME_TEXTURE_HEIGHT * factor,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    /// Create the CPU-mappable transfer buffer for a zoom factor
    ///
    /// Sized for the zoomed visible region only, not the padded texture.
    fn create_transfer_buffer(device: &Device, zoom: Zoom) -> Buffer {
        let factor = zoom.factor() as u64;
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Transfer Buffer"),
            size: (VISIBLE_WIDTH * VISIBLE_HEIGHT) as u64 * 4 * factor * factor,
            usage: wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        texture_view: &wgpu::TextureView,
        sampler: &Sampler,
        uniform: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    fn create_sampler(device: &Device, mag_filter: wgpu::FilterMode) -> Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        })
    }

    /// Create the render pipeline sampling the frame texture
    fn create_pipeline(
        device: &Device,
        surface_format: wgpu::TextureFormat,
    ) -> (RenderPipeline, BindGroupLayout) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group_layout)
    }
}

/// UV window the vertex shader applies to the fullscreen triangle
///
/// Covers the visible sub-region of the padded frame texture, shrunk
/// further when the output rect is cropped to the window.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniform {
    uv_origin: [f32; 2],
    uv_scale: [f32; 2],
}

/// Scaling mode actually honored by the driver
///
/// HQ stretch needs the 2x frame texture; adapters that cannot host it
/// fall back to aspect fit.
fn effective_mode(mode: ScalingMode, hq_supported: bool) -> ScalingMode {
    match mode {
        ScalingMode::HqStretch if !hq_supported => ScalingMode::AspectFit,
        _ => mode,
    }
}

/// Zoom factor the streaming resources must be sized for
fn zoom_for_mode(mode: ScalingMode) -> Zoom {
    match mode {
        ScalingMode::HqStretch => Zoom::X2,
        _ => Zoom::X1,
    }
}

/// Magnification filter per scaling mode: nearest only for pixel-perfect
fn mag_filter_for(mode: ScalingMode) -> wgpu::FilterMode {
    match mode {
        ScalingMode::PixelPerfect => wgpu::FilterMode::Nearest,
        ScalingMode::AspectFit | ScalingMode::HqStretch => wgpu::FilterMode::Linear,
    }
}

/// Intersect a centered output rect with the surface
fn clamp_to_surface(rect: Rect, width: u32, height: u32) -> Rect {
    let x = rect.x.min(width);
    let y = rect.y.min(height);
    Rect {
        x,
        y,
        width: rect.width.min(width - x),
        height: rect.height.min(height - y),
    }
}

/// Sampled UV window for an output rect and its on-surface portion
///
/// When the window is smaller than the rect, the viewport alone would
/// squeeze the frame into it; narrowing the UV window by the same
/// fraction shows the centered crop at the intended scale instead.
fn uv_window(rect: Rect, clamped: Rect) -> FrameUniform {
    let su = VISIBLE_WIDTH as f32 / FRAME_TEXTURE_WIDTH as f32;
    let sv = VISIBLE_HEIGHT as f32 / FRAME_TEXTURE_HEIGHT as f32;
    if rect.width == 0 || rect.height == 0 {
        return FrameUniform {
            uv_origin: [0.0, 0.0],
            uv_scale: [su, sv],
        };
    }
    let fx = clamped.width as f32 / rect.width as f32;
    let fy = clamped.height as f32 / rect.height as f32;
    let ox = (rect.width - clamped.width) as f32 / (2.0 * rect.width as f32);
    let oy = (rect.height - clamped.height) as f32 / (2.0 * rect.height as f32);
    FrameUniform {
        uv_origin: [ox * su, oy * sv],
        uv_scale: [fx * su, fy * sv],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_pads_visible_frame() {
        // Power-of-two padding must contain the visible frame at both zooms
        assert!(FRAME_TEXTURE_WIDTH as usize >= VISIBLE_WIDTH);
        assert!(FRAME_TEXTURE_HEIGHT as usize >= VISIBLE_HEIGHT);
        assert!(FRAME_TEXTURE_WIDTH.is_power_of_two());
        assert!(FRAME_TEXTURE_HEIGHT.is_power_of_two());
    }

    #[test]
    fn test_upload_rows_are_256_byte_aligned() {
        // copy_buffer_to_texture requires 256-byte row alignment
        for factor in [1u32, 2] {
            let bytes_per_row = 4 * VISIBLE_WIDTH as u32 * factor;
            assert_eq!(bytes_per_row % 256, 0, "zoom {}", factor);
        }
    }

    #[test]
    fn test_uv_scale_matches_padding() {
        // shader.wgsl samples only the visible sub-region
        let u = VISIBLE_WIDTH as f32 / FRAME_TEXTURE_WIDTH as f32;
        let v = VISIBLE_HEIGHT as f32 / FRAME_TEXTURE_HEIGHT as f32;
        assert_eq!(u, 0.625);
        assert_eq!(v, 0.9375);
    }

    #[test]
    fn test_magnification_nearest_only_for_pixel_perfect() {
        // Aspect fit magnifies by non-integer factors (1920x1080 window
        // gives a 1440x1080 rect, 2.25x), so it must blend between texels
        // like HQ stretch does; only integer zoom keeps the hard edges
        assert_eq!(
            mag_filter_for(ScalingMode::PixelPerfect),
            wgpu::FilterMode::Nearest
        );
        assert_eq!(
            mag_filter_for(ScalingMode::AspectFit),
            wgpu::FilterMode::Linear
        );
        assert_eq!(
            mag_filter_for(ScalingMode::HqStretch),
            wgpu::FilterMode::Linear
        );
    }

    #[test]
    fn test_hq_toggle_switches_streaming_zoom() {
        // Cycling into HQ stretch and back must recreate the streaming
        // pair exactly at the two transitions
        let modes = [
            ScalingMode::AspectFit,
            ScalingMode::HqStretch,
            ScalingMode::PixelPerfect,
        ];
        let mut zoom = Zoom::X1;
        let mut recreations = 0;
        for mode in modes {
            let wanted = zoom_for_mode(effective_mode(mode, true));
            if wanted != zoom {
                recreations += 1;
                zoom = wanted;
            }
        }
        assert_eq!(recreations, 2);
        assert_eq!(zoom, Zoom::X1);
    }

    #[test]
    fn test_hq_falls_back_without_2x_texture() {
        let mode = effective_mode(ScalingMode::HqStretch, false);
        assert_eq!(mode, ScalingMode::AspectFit);
        assert_eq!(zoom_for_mode(mode), Zoom::X1);
        assert_eq!(
            effective_mode(ScalingMode::HqStretch, true),
            ScalingMode::HqStretch
        );
    }

    #[test]
    fn test_clamp_keeps_fitting_rect() {
        let rect = Rect {
            x: 240,
            y: 0,
            width: 1440,
            height: 1080,
        };
        assert_eq!(clamp_to_surface(rect, 1920, 1080), rect);
    }

    #[test]
    fn test_clamp_intersects_oversized_rect() {
        // Pixel-perfect in a window below 1x: the centered rect starts
        // at the origin and overflows both edges
        let rect = Rect {
            x: 0,
            y: 0,
            width: VISIBLE_WIDTH as u32,
            height: VISIBLE_HEIGHT as u32,
        };
        let clamped = clamp_to_surface(rect, 320, 240);
        assert_eq!(
            clamped,
            Rect {
                x: 0,
                y: 0,
                width: 320,
                height: 240,
            }
        );
    }

    #[test]
    fn test_uv_window_covers_visible_region_when_rect_fits() {
        let rect = Rect {
            x: 240,
            y: 0,
            width: 1440,
            height: 1080,
        };
        let uniform = uv_window(rect, rect);
        assert_eq!(uniform.uv_origin, [0.0, 0.0]);
        assert_eq!(uniform.uv_scale, [0.625, 0.9375]);
    }

    #[test]
    fn test_uv_window_crops_centered_when_window_is_smaller() {
        // Half-size window under a 1x rect: sample the middle half of the
        // frame so on-screen pixels stay at their 1x size
        let rect = Rect {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        };
        let clamped = clamp_to_surface(rect, 320, 240);
        let uniform = uv_window(rect, clamped);
        assert_eq!(uniform.uv_scale, [0.625 * 0.5, 0.9375 * 0.5]);
        assert_eq!(uniform.uv_origin, [0.625 * 0.25, 0.9375 * 0.25]);
        // Crop stays inside the visible region
        assert!(uniform.uv_origin[0] + uniform.uv_scale[0] <= 0.625);
        assert!(uniform.uv_origin[1] + uniform.uv_scale[1] <= 0.9375);
    }
}
