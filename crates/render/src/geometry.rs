//! Static cube geometry: 6 faces, 4 unshared vertices each, one flat color
//! per face.
//!
//! Each face's vertices are listed in fan order (vertex 0 is the pivot) so a
//! face renders as the triangles 0-1-2 and 0-2-3.

use crate::context::GraphicsContext;
use crate::program::LinkedProgram;

pub const FACE_COUNT: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;
pub const VERTEX_COUNT: usize = FACE_COUNT * VERTICES_PER_FACE;

pub const POSITION_COMPONENTS: u32 = 3;
pub const COLOR_COMPONENTS: u32 = 4;

/// Cube faces in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    Top,
    Bottom,
    Right,
    Left,
}

impl Face {
    pub const ALL: [Face; FACE_COUNT] = [
        Face::Front,
        Face::Back,
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Index of the face's first vertex in the position/color buffers.
    pub fn first_vertex(self) -> u32 {
        (self.index() * VERTICES_PER_FACE) as u32
    }

    pub fn color(self) -> [f32; 4] {
        FACE_COLORS[self.index()]
    }
}

const P: f32 = 0.5;

/// Unit cube centered at the origin.
#[rustfmt::skip]
pub const CUBE_POSITIONS: [[f32; 3]; VERTEX_COUNT] = [
    // Front (+Z)
    [-P, -P,  P], [ P, -P,  P], [ P,  P,  P], [-P,  P,  P],
    // Back (-Z)
    [-P, -P, -P], [-P,  P, -P], [ P,  P, -P], [ P, -P, -P],
    // Top (+Y)
    [-P,  P, -P], [-P,  P,  P], [ P,  P,  P], [ P,  P, -P],
    // Bottom (-Y)
    [-P, -P, -P], [ P, -P, -P], [ P, -P,  P], [-P, -P,  P],
    // Right (+X)
    [ P, -P, -P], [ P,  P, -P], [ P,  P,  P], [ P, -P,  P],
    // Left (-X)
    [-P, -P, -P], [-P, -P,  P], [-P,  P,  P], [-P,  P, -P],
];

/// One color per face, in [`Face::ALL`] order.
pub const FACE_COLORS: [[f32; 4]; FACE_COUNT] = [
    [1.0, 0.0, 0.0, 1.0], // red
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 1.0, 0.0, 1.0], // yellow
    [1.0, 0.0, 1.0, 1.0], // magenta
    [0.0, 1.0, 1.0, 1.0], // cyan
];

/// Per-vertex colors: each face color repeated for its 4 vertices.
pub fn cube_colors() -> [[f32; 4]; VERTEX_COUNT] {
    std::array::from_fn(|v| FACE_COLORS[v / VERTICES_PER_FACE])
}

/// The cube's position and color buffers, uploaded once.
pub struct CubeGeometry<C: GraphicsContext> {
    positions: C::Buffer,
    colors: C::Buffer,
}

impl<C: GraphicsContext> CubeGeometry<C> {
    /// Upload positions and colors to static buffers and bind them to the
    /// program's attributes.
    pub fn upload(ctx: &mut C, program: &LinkedProgram<C>) -> Self {
        let positions = ctx.create_static_buffer(bytemuck::cast_slice(&CUBE_POSITIONS));
        ctx.bind_attribute(
            program.position_location(),
            &positions,
            POSITION_COMPONENTS,
        );

        let colors = cube_colors();
        let colors = ctx.create_static_buffer(bytemuck::cast_slice(&colors));
        ctx.bind_attribute(program.color_location(), &colors, COLOR_COMPONENTS);

        tracing::debug!(vertices = VERTEX_COUNT, "cube geometry uploaded");
        Self { positions, colors }
    }

    pub fn positions(&self) -> &C::Buffer {
        &self.positions
    }

    pub fn colors(&self) -> &C::Buffer {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CUBE_PROGRAM_LAYOUT;
    use crate::program::build_program;
    use crate::recording::{Command, RecordingContext};
    use crate::shaders::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER};
    use glam::Vec3;

    #[test]
    fn every_coordinate_is_half_unit() {
        assert_eq!(CUBE_POSITIONS.len(), 24);
        for p in CUBE_POSITIONS {
            for c in p {
                assert_eq!(c.abs(), 0.5);
            }
        }
    }

    #[test]
    fn faces_are_planar_fans() {
        for face in Face::ALL {
            let first = face.first_vertex() as usize;
            let quad: Vec<Vec3> = CUBE_POSITIONS[first..first + VERTICES_PER_FACE]
                .iter()
                .map(|p| Vec3::from_array(*p))
                .collect();

            // All four corners share exactly one fixed axis.
            let fixed: Vec<usize> = (0..3)
                .filter(|&axis| quad.iter().all(|v| v[axis] == quad[0][axis]))
                .collect();
            assert_eq!(fixed.len(), 1, "{face:?} is not axis-aligned");

            // Both fan triangles turn the same way, so the quad has no gaps.
            let n1 = (quad[1] - quad[0]).cross(quad[2] - quad[0]);
            let n2 = (quad[2] - quad[0]).cross(quad[3] - quad[0]);
            assert!(n1.dot(n2) > 0.0, "{face:?} fan folds over itself");
            assert!((n1.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn faces_are_distinct() {
        let mut fixed: Vec<(usize, i32)> = Face::ALL
            .iter()
            .map(|f| {
                let first = f.first_vertex() as usize;
                let quad = &CUBE_POSITIONS[first..first + 4];
                let axis = (0..3).find(|&a| quad.iter().all(|v| v[a] == quad[0][a])).unwrap();
                (axis, quad[0][axis].signum() as i32)
            })
            .collect();
        fixed.sort();
        fixed.dedup();
        assert_eq!(fixed.len(), FACE_COUNT);
    }

    #[test]
    fn face_colors_uniform_and_distinct() {
        let colors = cube_colors();
        for face in Face::ALL {
            let first = face.first_vertex() as usize;
            for v in &colors[first..first + VERTICES_PER_FACE] {
                assert_eq!(*v, face.color());
            }
        }
        for a in 0..FACE_COUNT {
            for b in (a + 1)..FACE_COUNT {
                assert_ne!(FACE_COLORS[a], FACE_COLORS[b]);
            }
        }
        assert_eq!(Face::Front.color(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Face::Left.color(), [0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn upload_creates_and_binds_two_buffers() {
        let mut ctx = RecordingContext::new();
        let program = build_program(
            &mut ctx,
            CUBE_VERTEX_SHADER,
            CUBE_FRAGMENT_SHADER,
            &CUBE_PROGRAM_LAYOUT,
        )
        .unwrap();
        let geometry = CubeGeometry::upload(&mut ctx, &program);

        assert_eq!(ctx.buffer_data(geometry.positions()).len(), 24 * 3);
        assert_eq!(ctx.buffer_data(geometry.colors()).len(), 24 * 4);
        assert_eq!(&ctx.buffer_data(geometry.colors())[..4], &[1.0, 0.0, 0.0, 1.0]);

        let binds: Vec<_> = ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::BindAttribute {
                    location,
                    components,
                    ..
                } => Some((*location, *components)),
                _ => None,
            })
            .collect();
        assert_eq!(binds, vec![(0, 3), (1, 4)]);
    }
}
