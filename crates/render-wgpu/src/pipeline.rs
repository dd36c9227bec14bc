use spincube_render::{ProgramLayout, ShaderStage, shaders};
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use wgpu::util::DeviceExt;

/// Format of the depth attachment used when depth testing is enabled.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Largest fan a single draw can cover.
pub const MAX_FAN_VERTICES: u32 = 64;

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// Triangle-list indices equivalent to a fan over `vertices` vertices:
/// `[0, 1, 2, 0, 2, 3, ...]`. Drawn with a base vertex, this covers any
/// contiguous fan up to that size.
pub fn fan_indices(vertices: u32) -> Vec<u16> {
    (1..vertices.saturating_sub(1))
        .flat_map(|i| [0, i as u16, i as u16 + 1])
        .collect()
}

/// Number of indices a fan of `count` vertices consumes.
pub fn fan_index_count(count: u32) -> u32 {
    count.saturating_sub(2) * 3
}

pub fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

fn entry_point(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => shaders::VERTEX_ENTRY_POINT,
        ShaderStage::Fragment => shaders::FRAGMENT_ENTRY_POINT,
    }
}

/// A WGSL module for one stage.
#[derive(Debug)]
pub struct WgpuShader {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
}

impl WgpuShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

/// Render pipeline plus the uniform storage it reads.
#[derive(Debug)]
pub struct LinkedPipeline {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) bind_group: wgpu::BindGroup,
    /// Uniform buffers keyed by binding index.
    pub(crate) uniforms: BTreeMap<u32, wgpu::Buffer>,
    pub(crate) layout: ProgramLayout,
    pub(crate) depth_test: bool,
}

/// Color and depth formats a pipeline renders into.
#[derive(Debug, Clone, Copy)]
pub struct PipelineTargets {
    pub color_format: wgpu::TextureFormat,
    pub depth_test: bool,
}

/// Compile WGSL for one stage. Validation errors come back as the log text.
pub fn compile_module(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<WgpuShader, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "cube_vertex_shader",
            ShaderStage::Fragment => "cube_fragment_shader",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(WgpuShader { module, stage }),
    }
}

/// Build the render pipeline for a vertex/fragment pair.
///
/// Each attribute in `layout` gets its own tightly packed vertex buffer slot,
/// in declaration order. Each uniform is a `mat4x4<f32>` in bind group 0.
pub fn link_pipeline(
    device: &wgpu::Device,
    vertex: &WgpuShader,
    fragment: &WgpuShader,
    layout: &ProgramLayout,
    targets: PipelineTargets,
) -> Result<LinkedPipeline, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "expected vertex + fragment stages, got {} + {}",
            vertex.stage, fragment.stage
        ));
    }

    let attributes = layout
        .attributes
        .iter()
        .map(|a| {
            let format = vertex_format(a.components).ok_or_else(|| {
                format!(
                    "attribute `{}` has unsupported width {}",
                    a.name, a.components
                )
            })?;
            Ok((
                u64::from(a.components) * std::mem::size_of::<f32>() as u64,
                [wgpu::VertexAttribute {
                    format,
                    offset: 0,
                    shader_location: a.location,
                }],
            ))
        })
        .collect::<Result<Vec<_>, String>>()?;
    let buffers: Vec<wgpu::VertexBufferLayout> = attributes
        .iter()
        .map(|(stride, attrs)| wgpu::VertexBufferLayout {
            array_stride: *stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        })
        .collect();

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = layout
        .uniforms
        .iter()
        .map(|u| wgpu::BindGroupLayoutEntry {
            binding: u.binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(MAT4_SIZE),
            },
            count: None,
        })
        .collect();
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &layout_entries,
    });

    let uniforms: BTreeMap<u32, wgpu::Buffer> = layout
        .uniforms
        .iter()
        .map(|u| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(u.name),
                contents: bytemuck::cast_slice(&glam::Mat4::IDENTITY.to_cols_array()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            (u.binding, buffer)
        })
        .collect();
    let bind_entries: Vec<wgpu::BindGroupEntry> = uniforms
        .iter()
        .map(|(binding, buffer)| wgpu::BindGroupEntry {
            binding: *binding,
            resource: buffer.as_entire_binding(),
        })
        .collect();
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout: &bind_group_layout,
        entries: &bind_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("cube_pipeline_layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("cube_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(entry_point(ShaderStage::Vertex)),
            compilation_options: Default::default(),
            buffers: &buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(entry_point(ShaderStage::Fragment)),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: targets.depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(err.to_string());
    }

    Ok(LinkedPipeline {
        pipeline,
        bind_group,
        uniforms,
        layout: *layout,
        depth_test: targets.depth_test,
    })
}

/// Index buffer holding [`fan_indices`] for [`MAX_FAN_VERTICES`].
pub fn create_fan_index_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("fan_index_buffer"),
        contents: bytemuck::cast_slice(&fan_indices(MAX_FAN_VERTICES)),
        usage: wgpu::BufferUsages::INDEX,
    })
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
