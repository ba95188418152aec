//! Lumen engine crate.
//!
//! Packs named shader uniforms into WGSL-aligned blocks and uploads them to
//! GPU buffers through wgpu.

pub mod device;
pub mod logging;
pub mod uniform;
