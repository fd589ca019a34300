//! Triangle meshes for the procedural primitives.

use std::f32::consts::{FRAC_PI_2, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::scene::Primitive;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn build(primitive: &Primitive) -> Self {
        match *primitive {
            Primitive::Icosahedron { radius, detail } => icosahedron(radius, detail),
            Primitive::Octahedron { radius } => octahedron(radius),
            Primitive::Capsule {
                radius,
                length,
                cap_segments,
                radial_segments,
            } => capsule(radius, length, cap_segments, radial_segments),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a flat-shaded triangle, wound counter-clockwise seen from outside.
    fn push_face(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let (b, c) = if normal.dot(a + b + c) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        let base = self.vertices.len() as u32;
        self.vertices.extend([
            Vertex::new(a, normal),
            Vertex::new(b, normal),
            Vertex::new(c, normal),
        ]);
        self.indices.extend([base, base + 1, base + 2]);
    }
}

/// Build a polyhedron whose faces are split `detail` times and pushed onto the sphere.
fn polyhedron(corners: &[Vec3], faces: &[[usize; 3]], radius: f32, detail: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let cols = detail as usize + 1;
    for face in faces {
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);
        // Row i holds cols - i + 1 points interpolated between edges a-c and b-c.
        let grid: Vec<Vec<Vec3>> = (0..=cols)
            .map(|i| {
                let t = i as f32 / cols as f32;
                let left = a.lerp(c, t);
                let right = b.lerp(c, t);
                let rows = cols - i;
                (0..=rows)
                    .map(|j| {
                        let point = if rows == 0 {
                            left
                        } else {
                            left.lerp(right, j as f32 / rows as f32)
                        };
                        point.normalize() * radius
                    })
                    .collect()
            })
            .collect();
        for i in 0..cols {
            for j in 0..cols - i {
                mesh.push_face(grid[i][j], grid[i][j + 1], grid[i + 1][j]);
                if j + 1 < cols - i {
                    mesh.push_face(grid[i][j + 1], grid[i + 1][j + 1], grid[i + 1][j]);
                }
            }
        }
    }
    mesh
}

fn icosahedron(radius: f32, detail: u32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    polyhedron(&corners, &faces, radius, detail)
}

fn octahedron(radius: f32) -> MeshData {
    let corners = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    let faces = [
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];
    polyhedron(&corners, &faces, radius, 0)
}

/// A lathed profile: bottom hemisphere, straight side, top hemisphere.
fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> MeshData {
    let cap_segments = cap_segments.max(1);
    let radial_segments = radial_segments.max(3);
    let half = length / 2.0;

    // (ring radius, height, normal elevation angle)
    let mut profile = Vec::with_capacity(2 * (cap_segments as usize + 1));
    for i in 0..=cap_segments {
        let angle = -FRAC_PI_2 + FRAC_PI_2 * i as f32 / cap_segments as f32;
        profile.push(((radius * angle.cos()).max(0.0), -half + radius * angle.sin(), angle));
    }
    for i in 0..=cap_segments {
        let angle = FRAC_PI_2 * i as f32 / cap_segments as f32;
        profile.push(((radius * angle.cos()).max(0.0), half + radius * angle.sin(), angle));
    }

    let mut mesh = MeshData::default();
    let stride = radial_segments + 1;
    for &(ring, height, angle) in &profile {
        for j in 0..=radial_segments {
            let phi = TAU * j as f32 / radial_segments as f32;
            let dir = Vec3::new(phi.sin(), 0.0, phi.cos());
            let position = dir * ring + Vec3::Y * height;
            let normal = dir * angle.cos() + Vec3::Y * angle.sin();
            mesh.vertices.push(Vertex::new(position, normal));
        }
    }
    for k in 0..profile.len() as u32 - 1 {
        for j in 0..radial_segments {
            let a = k * stride + j;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            mesh.indices.extend([a, d, c, a, c, b]);
        }
    }
    mesh
}
