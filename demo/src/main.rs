use std::path::Path;

use anyhow::Context;
use log::info;
use prism_engine::prelude::*;
use prism_engine::{logging, render::WgpuRenderer};

mod scene;

const DEFAULT_CONFIG: &str = "prism.toml";

/// Config from the path given as the first argument, else `prism.toml`
/// if present, else defaults.
fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}")),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            EngineConfig::load(DEFAULT_CONFIG).with_context(|| format!("loading {DEFAULT_CONFIG}"))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    logging::init(&config.log_filter);

    let demo = scene::build();
    info!(
        "scene ready: {} objects, {} animations",
        demo.scene.objects().len(),
        demo.animations.len()
    );

    let camera = config
        .camera
        .build(config.window.width, config.window.height);
    let controls = config.controls.build(camera.target);
    let render_loop: RenderLoop<WgpuRenderer, OrbitControls> =
        RenderLoop::new(demo.scene, camera, SystemClock::start_new())
            .with_controls(controls)
            .with_animations(demo.animations);

    WindowHost::new(config)
        .run(render_loop)
        .context("render session could not run")
}
