use crate::pipeline::{PipelineTargets, compile_module, link_pipeline};
use spincube_render::{CUBE_PROGRAM_LAYOUT, RenderError, ShaderSources, ShaderStage};

/// Device and queue on any adapter, with no surface attached.
pub fn headless_device() -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| RenderError::ContextUnavailable("no compatible GPU adapter".into()))?;

    tracing::debug!("headless adapter: {}", adapter.get_info().name);

    pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("spincube_headless_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .map_err(|e| RenderError::ContextUnavailable(e.to_string()))
}

/// Compile and link `sources` on a headless device without drawing.
pub fn validate_shaders(sources: ShaderSources<'_>) -> Result<(), RenderError> {
    let (device, _queue) = headless_device()?;

    let compile = |stage, source| {
        compile_module(&device, stage, source).map_err(|log| {
            tracing::error!("{stage} shader compile failed:\n{log}");
            RenderError::Compile { stage, log }
        })
    };
    let vertex = compile(ShaderStage::Vertex, sources.vertex)?;
    let fragment = compile(ShaderStage::Fragment, sources.fragment)?;

    let targets = PipelineTargets {
        color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        depth_test: true,
    };
    link_pipeline(&device, &vertex, &fragment, &CUBE_PROGRAM_LAYOUT, targets).map_err(|log| {
        tracing::error!("program link failed:\n{log}");
        RenderError::Link { log }
    })?;
    Ok(())
}
