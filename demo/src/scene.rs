//! The demo scene: three primitives, a sun and an ambient fill.

use glam::Vec3;
use prism_engine::prelude::*;

/// Oscillation frequency shared by the pulse and the bob, in radians per millisecond.
const FREQUENCY: f64 = 0.002;

pub struct DemoScene {
    pub scene: Scene,
    pub animations: Vec<AnimatedObject>,
}

pub fn build() -> DemoScene {
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

    let icosahedron = scene.add(
        "icosahedron",
        Primitive::Icosahedron {
            radius: 0.6,
            detail: 0,
        },
        Material::with_color(0xffd700).metalness(1.0).roughness(0.3),
        Transform::from_position(Vec3::new(2.0, 2.0, 0.0)),
    );

    let octahedron = scene.add(
        "octahedron",
        Primitive::Octahedron { radius: 0.6 },
        Material::with_color(0x008080)
            .opacity(0.6)
            .roughness(0.5)
            .metalness(0.7),
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
    );

    // Starts below the floor; the first tick lifts it to its bobbing height.
    let capsule = scene.add(
        "capsule",
        Primitive::Capsule {
            radius: 0.3,
            length: 0.8,
            cap_segments: 10,
            radial_segments: 20,
        },
        Material::with_color(0xff4500)
            .emissive(0xff4500, 2.0)
            .metalness(0.5)
            .roughness(0.2),
        Transform::from_position(Vec3::new(-2.0, -5.0, 0.0)),
    );

    let animations = vec![
        AnimatedObject::rotation(icosahedron, Axis::Y, RotationRate::PerTick(0.01)),
        AnimatedObject::scale_oscillation(octahedron, 0.2, FREQUENCY),
        AnimatedObject::position_oscillation(capsule, Axis::Y, 1.5, 0.05, FREQUENCY),
    ];

    DemoScene { scene, animations }
}
