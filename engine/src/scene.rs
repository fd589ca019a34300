//! Scene graph: a flat list of meshes plus the lights that illuminate them.

use std::fmt;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Stable identifier of an object in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Component of `v` along this axis.
    pub fn get(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Position, Euler rotation (XYZ order, radians) and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }
}

/// Procedural primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Icosahedron { radius: f32, detail: u32 },
    Octahedron { radius: f32 },
    /// A cylinder of `length` capped by two hemispheres of `radius`.
    Capsule {
        radius: f32,
        length: f32,
        cap_segments: u32,
        radial_segments: u32,
    },
}

/// Linear RGB color.
pub type Color = Vec3;

/// Convert a `0xRRGGBB` literal into a color with components in `[0, 1]`.
pub fn color_from_hex(hex: u32) -> Color {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Surface description of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub emissive: Color,
    pub emissive_intensity: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            metalness: 0.0,
            roughness: 1.0,
            opacity: 1.0,
            transparent: false,
            emissive: Vec3::ZERO,
            emissive_intensity: 1.0,
        }
    }
}

impl Material {
    pub fn with_color(hex: u32) -> Self {
        Self {
            color: color_from_hex(hex),
            ..Self::default()
        }
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    /// Make the material translucent with the given opacity.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = true;
        self
    }

    pub fn emissive(mut self, hex: u32, intensity: f32) -> Self {
        self.emissive = color_from_hex(hex);
        self.emissive_intensity = intensity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Parallel light shining from `position` towards the origin.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
    },
    Ambient { color: Color, intensity: f32 },
}

/// A renderable entity.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub primitive: Primitive,
    pub material: Material,
    pub transform: Transform,
}

#[derive(Debug, Default, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its id. Ids are never reused.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        primitive: Primitive,
        material: Material,
        transform: Transform,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SceneObject {
            id,
            name: name.into(),
            primitive,
            material,
            transform,
        });
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(scene: &mut Scene, name: &str) -> ObjectId {
        scene.add(
            name,
            Primitive::Octahedron { radius: 1.0 },
            Material::default(),
            Transform::default(),
        )
    }

    #[test]
    fn test_ids_are_not_reused_after_remove() {
        let mut scene = Scene::new();
        let a = add(&mut scene, "a");
        assert!(scene.remove(a).is_some());
        let b = add(&mut scene, "b");
        assert_ne!(a, b);
        assert!(scene.get(a).is_none());
        assert_eq!(scene.get(b).map(|o| o.name.as_str()), Some("b"));
    }

    #[test]
    fn test_color_from_hex() {
        let c = color_from_hex(0xff4500);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 69.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_transform_matrix_translates_and_scales() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_axis_set_only_touches_one_component() {
        let mut v = Vec3::new(-2.0, -5.0, 0.0);
        Axis::Y.set(&mut v, 1.5);
        assert_eq!(v, Vec3::new(-2.0, 1.5, 0.0));
        assert_eq!(Axis::Y.get(v), 1.5);
    }

    #[test]
    fn test_opacity_marks_transparent() {
        let m = Material::with_color(0x008080).opacity(0.6);
        assert!(m.transparent);
        assert_eq!(m.opacity, 0.6);
    }
}
