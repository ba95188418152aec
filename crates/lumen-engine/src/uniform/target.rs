use super::error::{Result, UniformError};

/// Destination for uniform data: allocates GPU buffers and copies bytes into them.
///
/// Uploads to the same handle must be applied in submission order.
pub trait UploadTarget {
    type Handle;

    /// Creates a buffer of exactly `size` bytes usable as a uniform source and
    /// copy destination.
    fn allocate(&mut self, size: u64) -> Result<Self::Handle>;

    /// Copies `bytes` into `handle` starting at `offset`.
    fn upload(&mut self, handle: &Self::Handle, offset: u64, bytes: &[u8]) -> Result<()>;

    /// Releases a buffer that is no longer used.
    fn release(&mut self, handle: Self::Handle) {
        drop(handle);
    }
}

/// [`UploadTarget`] backed by a wgpu device and queue.
///
/// Borrowed per write; the packer never holds on to the device.
pub struct WgpuTarget<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub label: Option<&'a str>,
}

impl<'a> WgpuTarget<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            label: None,
        }
    }

    #[inline]
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }
}

impl UploadTarget for WgpuTarget<'_> {
    type Handle = wgpu::Buffer;

    fn allocate(&mut self, size: u64) -> Result<wgpu::Buffer> {
        let limits = self.device.limits();
        check_allocation(
            size,
            u64::from(limits.max_uniform_buffer_binding_size),
            limits.max_buffer_size,
        )?;

        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label.unwrap_or("lumen uniform buffer")),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn upload(&mut self, handle: &wgpu::Buffer, offset: u64, bytes: &[u8]) -> Result<()> {
        let end = offset + bytes.len() as u64;
        if end > handle.size() {
            return Err(UniformError::Resource(format!(
                "upload of {} bytes at offset {offset} overruns buffer of {} bytes",
                bytes.len(),
                handle.size()
            )));
        }

        self.queue.write_buffer(handle, offset, bytes);
        Ok(())
    }

    fn release(&mut self, handle: wgpu::Buffer) {
        handle.destroy();
    }
}

/// Validates a uniform buffer size against device limits.
fn check_allocation(size: u64, max_binding: u64, max_buffer: u64) -> Result<()> {
    if size == 0 {
        return Err(UniformError::Resource("cannot allocate a zero-sized uniform buffer".into()));
    }

    let limit = max_binding.min(max_buffer);
    if size > limit {
        log::warn!("uniform block of {size} bytes exceeds device limit of {limit} bytes");
        return Err(UniformError::Resource(format!(
            "uniform block of {size} bytes exceeds device limit of {limit} bytes"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_within_limits() {
        assert_eq!(check_allocation(80, 65536, 1 << 28), Ok(()));
        assert_eq!(check_allocation(65536, 65536, 1 << 28), Ok(()));
    }

    #[test]
    fn allocation_zero_size_rejected() {
        assert!(matches!(check_allocation(0, 65536, 1 << 28), Err(UniformError::Resource(_))));
    }

    #[test]
    fn allocation_uses_smaller_limit() {
        assert!(matches!(check_allocation(4096, 65536, 1024), Err(UniformError::Resource(_))));
        assert!(matches!(check_allocation(65540, 65536, 1 << 28), Err(UniformError::Resource(_))));
    }
}
