//! wgpu implementation of the [`Renderer`] collaborator.

mod context;
pub mod geometry;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::{debug, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

pub use context::GpuContext;
use context::DEPTH_FORMAT;
use geometry::{MeshData, Vertex};

use crate::camera::PerspectiveCamera;
use crate::config::RenderConfig;
use crate::driver::Renderer;
use crate::error::RenderError;
use crate::scene::{Light, ObjectId, Scene, SceneObject};

/// Per-frame uniforms shared by every object.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

impl FrameUniform {
    /// Light intensities are divided by PI to match a Lambertian BRDF.
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut light_dir = Vec3::Y;
        let mut light_color = Vec3::ZERO;
        let mut ambient = Vec3::ZERO;
        let mut has_directional = false;
        for light in scene.lights() {
            match *light {
                Light::Directional {
                    color,
                    intensity,
                    position,
                } if !has_directional => {
                    light_dir = position.normalize_or_zero();
                    light_color = color * intensity / PI;
                    has_directional = true;
                }
                Light::Directional { .. } => {
                    debug!("only the first directional light is shaded");
                }
                Light::Ambient { color, intensity } => ambient += color * intensity / PI,
            }
        }
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_dir: light_dir.extend(0.0).to_array(),
            light_color: light_color.extend(1.0).to_array(),
            ambient: ambient.extend(1.0).to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    emissive: [f32; 4],
    params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(object: &SceneObject) -> Self {
        let model = object.transform.matrix();
        let material = &object.material;
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: material.color.extend(material.opacity).to_array(),
            emissive: (material.emissive * material.emissive_intensity)
                .extend(0.0)
                .to_array(),
            params: [material.metalness, material.roughness, 0.0, 0.0],
        }
    }
}

/// Opaque objects first in scene order, then transparent ones back to front.
pub fn draw_order(scene: &Scene, camera: &PerspectiveCamera) -> Vec<(ObjectId, bool)> {
    let (mut transparent, opaque): (Vec<&SceneObject>, Vec<&SceneObject>) = scene
        .objects()
        .iter()
        .partition(|o| o.material.transparent);
    let distance = |o: &SceneObject| o.transform.position.distance_squared(camera.position);
    transparent.sort_by(|a, b| distance(*b).total_cmp(&distance(*a)));
    opaque
        .into_iter()
        .map(|o| (o.id, false))
        .chain(transparent.into_iter().map(|o| (o.id, true)))
        .collect()
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct WgpuRenderer {
    ctx: GpuContext,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    meshes: HashMap<ObjectId, GpuMesh>,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    clear_color: wgpu::Color,
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

impl WgpuRenderer {
    pub async fn new(window: Arc<Window>, config: &RenderConfig) -> Result<Self, RenderError> {
        let ctx = GpuContext::new(window, config).await?;
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let frame_layout = uniform_layout(device, "frame layout");
        let object_layout = uniform_layout(device, "object layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("prism pipeline layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, blend: wgpu::BlendState, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.format(),
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: ctx.sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };
        let opaque_pipeline = pipeline("opaque pipeline", wgpu::BlendState::REPLACE, true);
        let transparent_pipeline =
            pipeline("transparent pipeline", wgpu::BlendState::ALPHA_BLENDING, false);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniforms"),
            size: std::mem::size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let [r, g, b] = config.background.map(f64::from);
        let clear_color = if config.transparent {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color { r, g, b, a: 1.0 }
        };

        let depth_view = ctx.create_attachment("depth", DEPTH_FORMAT);
        let msaa_view = (ctx.sample_count > 1).then(|| ctx.create_attachment("msaa color", ctx.format()));

        Ok(Self {
            ctx,
            opaque_pipeline,
            transparent_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            meshes: HashMap::new(),
            depth_view,
            msaa_view,
            clear_color,
        })
    }

    fn upload(&self, object: &SceneObject) -> GpuMesh {
        let device = &self.ctx.device;
        let data = MeshData::build(&object.primitive);
        debug!(
            "uploading {} ({} triangles)",
            object.name,
            data.triangle_count()
        );
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(object.name.as_str()),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(object.name.as_str()),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(object.name.as_str()),
            contents: bytemuck::bytes_of(&ObjectUniform::new(object)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(object.name.as_str()),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    /// Upload meshes for new objects and release those no longer in the scene.
    fn sync_meshes(&mut self, scene: &Scene) {
        self.meshes.retain(|id, _| scene.get(*id).is_some());
        for object in scene.objects() {
            if !self.meshes.contains_key(&object.id) {
                let mesh = self.upload(object);
                self.meshes.insert(object.id, mesh);
            }
        }
    }

    fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.ctx.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                warn!("surface {err}, reconfiguring");
                self.ctx.reconfigure();
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Renderer for WgpuRenderer {
    fn draw(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.sync_meshes(scene);

        let queue = &self.ctx.queue;
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniform::new(scene, camera)),
        );
        for object in scene.objects() {
            if let Some(mesh) = self.meshes.get(&object.id) {
                queue.write_buffer(
                    &mesh.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&ObjectUniform::new(object)),
                );
            }
        }

        let order = draw_order(scene, camera);
        let frame = self.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let mut transparent_bound = false;
            pass.set_pipeline(&self.opaque_pipeline);
            for (id, transparent) in order {
                let Some(mesh) = self.meshes.get(&id) else {
                    continue;
                };
                if transparent && !transparent_bound {
                    pass.set_pipeline(&self.transparent_pipeline);
                    transparent_bound = true;
                }
                pass.set_bind_group(1, &mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.depth_view = self.ctx.create_attachment("depth", DEPTH_FORMAT);
        if self.msaa_view.is_some() {
            self.msaa_view = Some(self.ctx.create_attachment("msaa color", self.ctx.format()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Primitive, Transform};
    use glam::Mat4;

    fn object(scene: &mut Scene, name: &str, z: f32, material: Material) -> ObjectId {
        scene.add(
            name,
            Primitive::Octahedron { radius: 0.6 },
            material,
            Transform::from_position(Vec3::new(0.0, 0.0, z)),
        )
    }

    #[test]
    fn test_draw_order_puts_transparent_last_back_to_front() {
        let mut scene = Scene::new();
        let near = object(&mut scene, "near", 4.0, Material::default().opacity(0.5));
        let solid = object(&mut scene, "solid", 0.0, Material::default());
        let far = object(&mut scene, "far", -4.0, Material::default().opacity(0.5));
        let mut camera = PerspectiveCamera::default();
        camera.set_position(Vec3::new(0.0, 0.0, 6.0));

        let order = draw_order(&scene, &camera);
        assert_eq!(order, vec![(solid, false), (far, true), (near, true)]);
    }

    #[test]
    fn test_frame_uniform_scales_lights() {
        let mut scene = Scene::new();
        scene.add_light(Light::Directional {
            color: Vec3::ONE,
            intensity: 4.0,
            position: Vec3::new(3.0, 3.0, 3.0),
        });
        scene.add_light(Light::Ambient {
            color: Vec3::ONE,
            intensity: 1.2,
        });
        let uniform = FrameUniform::new(&scene, &PerspectiveCamera::default());
        assert!((uniform.light_color[0] - 4.0 / PI).abs() < 1e-6);
        assert!((uniform.ambient[0] - 1.2 / PI).abs() < 1e-6);
        let dir = Vec3::from_slice(&uniform.light_dir[..3]);
        assert!((dir - Vec3::ONE.normalize()).length() < 1e-6);
    }

    #[test]
    fn test_object_uniform_carries_opacity_and_emissive() {
        let mut scene = Scene::new();
        let id = object(
            &mut scene,
            "capsule",
            0.0,
            Material::with_color(0xff4500).emissive(0xff4500, 2.0),
        );
        let uniform = scene.get(id).map(ObjectUniform::new);
        let uniform = uniform.expect("object exists");
        assert_eq!(uniform.color[3], 1.0);
        assert_eq!(uniform.emissive[0], 2.0);
        assert_eq!(uniform.model, Mat4::IDENTITY.to_cols_array_2d());
    }
}
