use crate::pipeline::{
    self, LinkedPipeline, MAX_FAN_VERTICES, PipelineTargets, WgpuShader, fan_index_count,
};
use glam::Mat4;
use spincube_render::{GraphicsContext, ProgramLayout, RenderError, ShaderStage, SurfaceSize};
use std::collections::BTreeMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// A linked program. Cheap to clone; clones share the pipeline.
#[derive(Debug, Clone)]
pub struct WgpuProgram(Arc<LinkedPipeline>);

/// A static vertex buffer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WgpuBuffer(Arc<wgpu::Buffer>);

/// Work queued between `clear` and `present`.
#[derive(Debug, Default)]
struct PendingFrame {
    clear: Option<[f32; 4]>,
    fans: Vec<(u32, u32)>,
}

/// [`GraphicsContext`] on a wgpu surface.
///
/// Calls are buffered per frame and encoded into a single render pass on
/// [`present`](GraphicsContext::present). Uniform writes go straight to the
/// queue and land before that pass executes.
pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_test: bool,
    depth_view: Option<wgpu::TextureView>,
    fan_index_buffer: wgpu::Buffer,
    current: Option<WgpuProgram>,
    attributes: BTreeMap<u32, WgpuBuffer>,
    pending: PendingFrame,
    adapter_info: wgpu::AdapterInfo,
}

impl WgpuContext {
    /// Create a surface for `target` and a device that can present to it.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(target)
            .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| {
            RenderError::ContextUnavailable("no GPU adapter can present to this window".into())
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("spincube_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| {
                RenderError::ContextUnavailable("surface reports no texture formats".into())
            })?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let fan_index_buffer = pipeline::create_fan_index_buffer(&device);
        let adapter_info = adapter.get_info();

        tracing::info!(
            "GPU initialized with {} backend on {}",
            adapter_info.backend.to_str(),
            adapter_info.name
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_test: false,
            depth_view: None,
            fan_index_buffer,
            current: None,
            attributes: BTreeMap::new(),
            pending: PendingFrame::default(),
            adapter_info,
        })
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    fn encode_frame(
        &self,
        frame: PendingFrame,
        program: &LinkedPipeline,
        view: &wgpu::TextureView,
    ) {
        let mut slots = Vec::with_capacity(program.layout.attributes.len());
        for attr in program.layout.attributes {
            match self.attributes.get(&attr.location) {
                Some(buffer) => slots.push(buffer),
                None => {
                    tracing::warn!("attribute `{}` has no bound buffer; skipping draws", attr.name);
                    break;
                }
            }
        }
        let can_draw = slots.len() == program.layout.attributes.len();

        let color_load = match frame.clear {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: f64::from(r),
                g: f64::from(g),
                b: f64::from(b),
                a: f64::from(a),
            }),
            None => wgpu::LoadOp::Load,
        };
        let depth_attachment = match (&self.depth_view, program.depth_test) {
            (Some(depth), true) => Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: if frame.clear.is_some() {
                        wgpu::LoadOp::Clear(1.0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            _ => None,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_attachment,
                ..Default::default()
            });

            if can_draw && !frame.fans.is_empty() {
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &program.bind_group, &[]);
                for (slot, buffer) in slots.iter().enumerate() {
                    pass.set_vertex_buffer(slot as u32, buffer.0.slice(..));
                }
                pass.set_index_buffer(self.fan_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                for (first, count) in frame.fans {
                    pass.draw_indexed(0..fan_index_count(count), first as i32, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl GraphicsContext for WgpuContext {
    type Shader = WgpuShader;
    type Program = WgpuProgram;
    type Buffer = WgpuBuffer;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        pipeline::compile_module(&self.device, stage, source)
    }

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String> {
        let targets = PipelineTargets {
            color_format: self.config.format,
            depth_test: self.depth_test,
        };
        pipeline::link_pipeline(&self.device, vertex, fragment, layout, targets)
            .map(|linked| WgpuProgram(Arc::new(linked)))
    }

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        program.0.layout.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        program.0.layout.uniform(name).map(|u| u.binding)
    }

    fn use_program(&mut self, program: &Self::Program) {
        self.current = Some(program.clone());
    }

    fn create_static_buffer(&mut self, data: &[f32]) -> Self::Buffer {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("static_vertex_buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        WgpuBuffer(Arc::new(buffer))
    }

    fn bind_attribute(&mut self, location: u32, buffer: &Self::Buffer, components: u32) {
        if let Some(program) = &self.current {
            let declared = program.0.layout.attributes.iter().find(|a| a.location == location);
            if declared.map(|a| a.components) != Some(components) {
                tracing::warn!(
                    location,
                    components,
                    "attribute binding does not match the pipeline's vertex layout"
                );
            }
        }
        self.attributes.insert(location, buffer.clone());
    }

    fn enable_depth_test(&mut self) {
        if self.depth_test {
            return;
        }
        self.depth_test = true;
        self.depth_view = Some(pipeline::create_depth_texture(
            &self.device,
            self.config.width,
            self.config.height,
        ));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        if self.depth_test {
            self.depth_view = Some(pipeline::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
            ));
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.pending.clear = Some(color);
    }

    fn set_uniform_matrix(&mut self, location: u32, matrix: &Mat4) {
        let Some(buffer) = self
            .current
            .as_ref()
            .and_then(|p| p.0.uniforms.get(&location))
        else {
            tracing::warn!(location, "no uniform at this location in the current program");
            return;
        };
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(&matrix.to_cols_array()));
    }

    fn draw_triangle_fan(&mut self, first: u32, count: u32) {
        if count > MAX_FAN_VERTICES {
            tracing::warn!(count, "triangle fan exceeds {MAX_FAN_VERTICES} vertices; skipped");
            return;
        }
        self.pending.fans.push((first, count));
    }

    fn present(&mut self) {
        let frame = std::mem::take(&mut self.pending);
        let Some(program) = self.current.clone() else {
            tracing::warn!("present with no current program");
            return;
        };

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.encode_frame(frame, &program.0, &view);
        output.present();
    }
}
