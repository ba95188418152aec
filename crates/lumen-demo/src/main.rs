//! Headless uniform demo.
//!
//! Packs the quad demo's uniforms (time, position, size, projection), then
//! animates `time` and re-uploads the block once per iteration.

mod config;

use std::time::Instant;

use anyhow::{Context, Result};

use lumen_engine::device::{Gpu, GpuInit};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::uniform::{UniformBuffer, UniformBufferConfig};

use crate::config::DemoConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env()?;
    log::info!("{config:?}");

    let gpu = Gpu::new_blocking(GpuInit::default()).context("GPU initialization failed")?;

    let mut ub: UniformBuffer = UniformBuffer::with_config(UniformBufferConfig {
        label: "quad uniforms".to_string(),
    });
    ub.add("time", 1.0f32)?;
    ub.add("position", glam::Vec2::new(150.0, 150.0))?;
    ub.add("size", glam::Vec2::new(200.0, 200.0))?;
    ub.add("projection", projection(&config))?;

    for entry in ub.layout().entries() {
        log::info!(
            "{:>12} @ {:>3} +{:<2} {}",
            entry.name.unwrap_or("<padding>"),
            entry.offset,
            entry.size,
            entry.kind.map_or("", |k| k.wgsl_name()),
        );
    }

    ub.write_wgpu(gpu.device(), gpu.queue())?;

    // What a pipeline would declare for `@binding(0)`.
    let entry = ub.layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT);
    log::info!("binding {}: {:?}", entry.binding, entry.ty);

    let start = Instant::now();
    for _ in 0..config.frames {
        ub.update("time", start.elapsed().as_secs_f32())?;
        ub.write_wgpu(gpu.device(), gpu.queue())?;
    }
    gpu.flush()?;

    log::info!(
        "uploaded {} frames of a {}-byte block in {:.2?}",
        config.frames,
        ub.size(),
        start.elapsed()
    );

    Ok(())
}

/// Pixel-space orthographic projection with a top-left origin.
fn projection(config: &DemoConfig) -> glam::Mat4 {
    glam::Mat4::orthographic_rh(
        0.0,
        config.native_width as f32,
        config.native_height as f32,
        0.0,
        -1.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_maps_canvas_corners_to_ndc() {
        let p = projection(&DemoConfig::default());

        let top_left = p.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = p.project_point3(glam::Vec3::new(320.0, 180.0, 0.0));

        assert!((top_left - glam::Vec3::new(-1.0, 1.0, top_left.z)).length() < 1e-5);
        assert!((bottom_right - glam::Vec3::new(1.0, -1.0, bottom_right.z)).length() < 1e-5);
    }

    #[test]
    fn quad_uniform_layout() {
        let mut ub: UniformBuffer<()> = UniformBuffer::new();
        ub.add("time", 1.0f32).unwrap();
        ub.add("position", glam::Vec2::new(150.0, 150.0)).unwrap();
        ub.add("size", glam::Vec2::new(200.0, 200.0)).unwrap();
        ub.add("projection", projection(&DemoConfig::default())).unwrap();

        let l = ub.layout();
        assert_eq!(l.offset_of("time"), Some(0));
        assert_eq!(l.offset_of("position"), Some(8));
        assert_eq!(l.offset_of("size"), Some(16));
        assert_eq!(l.offset_of("projection"), Some(32));
        assert_eq!(ub.size(), 96);
    }
}
