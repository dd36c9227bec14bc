use crate::context::{GraphicsContext, ProgramLayout, ShaderStage};
use glam::Mat4;

/// One call made against a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileShader { stage: ShaderStage, ok: bool },
    LinkProgram { ok: bool },
    UseProgram { program: u32 },
    CreateBuffer { buffer: u32, len: usize },
    BindAttribute {
        location: u32,
        buffer: u32,
        components: u32,
    },
    EnableDepthTest,
    SetViewport { width: u32, height: u32 },
    Clear { color: [f32; 4] },
    SetUniformMatrix { location: u32, matrix: Mat4 },
    DrawTriangleFan { first: u32, count: u32 },
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingShader {
    id: u32,
    stage: ShaderStage,
}

impl RecordingShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingProgram {
    id: u32,
    layout: ProgramLayout,
}

impl RecordingProgram {
    pub fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingBuffer {
    id: u32,
}

/// Headless graphics context that records every call.
///
/// Used by tests and the CLI to drive the renderer without a GPU. Shader
/// sources get a structural WGSL check (balanced delimiters and the stage's
/// entry attribute) so malformed sources fail to compile the way they would
/// on a device.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<Command>,
    buffers: Vec<Vec<f32>>,
    next_id: u32,
    pending_link_failure: Option<String>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `link_program` call fail with `log`.
    pub fn fail_next_link(&mut self, log: impl Into<String>) {
        self.pending_link_failure = Some(log.into());
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Contents uploaded to `buffer`.
    pub fn buffer_data(&self, buffer: &RecordingBuffer) -> &[f32] {
        &self.buffers[buffer.id as usize]
    }

    pub fn draw_calls(&self) -> usize {
        self.count(|c| matches!(c, Command::DrawTriangleFan { .. }))
    }

    pub fn viewport_changes(&self) -> usize {
        self.count(|c| matches!(c, Command::SetViewport { .. }))
    }

    pub fn frames_presented(&self) -> usize {
        self.count(|c| matches!(c, Command::Present))
    }

    /// Most recent matrix uploaded to any uniform.
    pub fn last_uniform_matrix(&self) -> Option<Mat4> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::SetUniformMatrix { matrix, .. } => Some(*matrix),
            _ => None,
        })
    }

    /// Human-readable tally of the recorded calls.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Commands: {}\n", self.commands.len()));
        out.push_str(&format!("Buffers: {}\n", self.buffers.len()));
        out.push_str(&format!("Frames presented: {}\n", self.frames_presented()));
        out.push_str(&format!("Draw calls: {}\n", self.draw_calls()));
        out.push_str(&format!("Viewport changes: {}\n", self.viewport_changes()));
        for c in &self.commands {
            if let Command::SetViewport { width, height } = c {
                out.push_str(&format!("  viewport {width}x{height}\n"));
            }
        }
        out
    }

    fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsContext for RecordingContext {
    type Shader = RecordingShader;
    type Program = RecordingProgram;
    type Buffer = RecordingBuffer;

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String> {
        let result = check_wgsl(stage, source);
        self.commands.push(Command::CompileShader {
            stage,
            ok: result.is_ok(),
        });
        result?;
        Ok(RecordingShader {
            id: self.alloc_id(),
            stage,
        })
    }

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, String> {
        let result = if let Some(log) = self.pending_link_failure.take() {
            Err(log)
        } else if vertex.stage != ShaderStage::Vertex {
            Err(format!("shader {} is not a vertex stage", vertex.id))
        } else if fragment.stage != ShaderStage::Fragment {
            Err(format!("shader {} is not a fragment stage", fragment.id))
        } else {
            Ok(())
        };
        self.commands.push(Command::LinkProgram { ok: result.is_ok() });
        result?;
        Ok(RecordingProgram {
            id: self.alloc_id(),
            layout: *layout,
        })
    }

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        program.layout.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        program.layout.uniform(name).map(|u| u.binding)
    }

    fn use_program(&mut self, program: &Self::Program) {
        self.commands.push(Command::UseProgram {
            program: program.id,
        });
    }

    fn create_static_buffer(&mut self, data: &[f32]) -> Self::Buffer {
        let id = self.buffers.len() as u32;
        self.buffers.push(data.to_vec());
        self.commands.push(Command::CreateBuffer {
            buffer: id,
            len: data.len(),
        });
        RecordingBuffer { id }
    }

    fn bind_attribute(&mut self, location: u32, buffer: &Self::Buffer, components: u32) {
        self.commands.push(Command::BindAttribute {
            location,
            buffer: buffer.id,
            components,
        });
    }

    fn enable_depth_test(&mut self) {
        self.commands.push(Command::EnableDepthTest);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.commands.push(Command::SetViewport { width, height });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::Clear { color });
    }

    fn set_uniform_matrix(&mut self, location: u32, matrix: &Mat4) {
        self.commands.push(Command::SetUniformMatrix {
            location,
            matrix: *matrix,
        });
    }

    fn draw_triangle_fan(&mut self, first: u32, count: u32) {
        self.commands.push(Command::DrawTriangleFan { first, count });
    }

    fn present(&mut self) {
        self.commands.push(Command::Present);
    }
}

/// Structural WGSL check: delimiters balance and the stage attribute exists.
fn check_wgsl(stage: ShaderStage, source: &str) -> Result<(), String> {
    let mut open: Vec<(char, usize)> = Vec::new();
    for (line_no, line) in source.lines().enumerate() {
        let line = line.split("//").next().unwrap_or("");
        for ch in line.chars() {
            match ch {
                '(' | '{' | '[' => open.push((ch, line_no + 1)),
                ')' | '}' | ']' => {
                    let expected = match ch {
                        ')' => '(',
                        '}' => '{',
                        _ => '[',
                    };
                    match open.pop() {
                        Some((c, _)) if c == expected => {}
                        Some((c, at)) => {
                            return Err(format!(
                                "{}: unexpected `{ch}`, `{c}` opened on line {at} is still open",
                                line_no + 1
                            ));
                        }
                        None => return Err(format!("{}: unmatched `{ch}`", line_no + 1)),
                    }
                }
                _ => {}
            }
        }
    }
    if let Some((c, at)) = open.pop() {
        return Err(format!("{at}: `{c}` is never closed"));
    }

    let attribute = match stage {
        ShaderStage::Vertex => "@vertex",
        ShaderStage::Fragment => "@fragment",
    };
    if !source.contains(attribute) {
        return Err(format!("no `{attribute}` entry point"));
    }
    Ok(())
}
