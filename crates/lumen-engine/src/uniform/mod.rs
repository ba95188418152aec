//! Uniform block packing and upload.
//!
//! Named values are packed into a single block following WGSL uniform
//! address space alignment (4 / 8 / 16 bytes), with explicit zero padding
//! between entries. The block is uploaded slot by slot into a GPU buffer
//! sized exactly to the block.
//!
//! ```rust,ignore
//! let mut ub = UniformBuffer::new();
//! ub.add("time", 0.0f32)?;
//! ub.add("position", glam::Vec2::new(150.0, 150.0))?;
//! ub.add("projection", glam::Mat4::IDENTITY)?;
//!
//! // per frame
//! ub.update("time", t)?;
//! ub.write_wgpu(device, queue)?;
//! ```

mod buffer;
mod error;
mod layout;
mod target;
mod value;

pub use buffer::{UniformBuffer, UniformBufferConfig};
pub use error::{Result, UniformError};
pub use layout::{UniformEntry, UniformLayout};
pub use target::{UploadTarget, WgpuTarget};
pub use value::{UniformKind, UniformValue};
