use std::num::NonZeroU64;

use super::error::Result;
use super::layout::UniformLayout;
use super::target::{UploadTarget, WgpuTarget};
use super::value::UniformValue;

/// Uniform buffer configuration.
#[derive(Debug, Clone)]
pub struct UniformBufferConfig {
    /// Debug label applied to the GPU buffer.
    pub label: String,
}

impl Default for UniformBufferConfig {
    fn default() -> Self {
        Self {
            label: "lumen uniform buffer".to_string(),
        }
    }
}

/// A packed uniform block plus the GPU buffer it is uploaded to.
///
/// Values are added and updated on the CPU; [`write`](Self::write) (re)allocates
/// the GPU buffer when the block size changed and uploads every slot.
///
/// `H` is the buffer handle of the [`UploadTarget`] used for writes.
pub struct UniformBuffer<H = wgpu::Buffer> {
    config: UniformBufferConfig,
    layout: UniformLayout,

    /// Current GPU buffer and its allocated size.
    resource: Option<(H, u64)>,
}

impl<H> Default for UniformBuffer<H> {
    fn default() -> Self {
        Self::with_config(UniformBufferConfig::default())
    }
}

impl<H> UniformBuffer<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UniformBufferConfig) -> Self {
        Self {
            config,
            layout: UniformLayout::new(),
            resource: None,
        }
    }

    /// See [`UniformLayout::add`].
    pub fn add(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        self.layout.add(name, value)
    }

    /// See [`UniformLayout::update`].
    pub fn update(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        self.layout.update(name, value)
    }

    /// Current block size in bytes. This is also the binding's minimum size.
    #[inline]
    pub fn size(&self) -> u64 {
        self.layout.size()
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// GPU buffer from the last successful allocation.
    #[inline]
    pub fn handle(&self) -> Option<&H> {
        self.resource.as_ref().map(|(h, _)| h)
    }

    /// `None` while the block is empty.
    #[inline]
    pub fn min_binding_size(&self) -> Option<NonZeroU64> {
        NonZeroU64::new(self.size())
    }

    /// Uploads the current values to the target.
    ///
    /// - empty block: no-op
    /// - no buffer yet, or buffer size differs from the block size: the old
    ///   buffer is released and a new one of exactly `size()` bytes allocated
    /// - every slot (padding included) is uploaded at its offset
    ///
    /// Target failures are returned as-is; nothing is retried.
    pub fn write<T>(&mut self, target: &mut T) -> Result<()>
    where
        T: UploadTarget<Handle = H>,
    {
        if self.layout.is_empty() {
            return Ok(());
        }

        let size = self.layout.size();
        let stale = !matches!(self.resource, Some((_, allocated)) if allocated == size);
        if stale {
            if let Some((old, old_size)) = self.resource.take() {
                log::debug!("{}: releasing {old_size}-byte buffer", self.config.label);
                target.release(old);
            }

            log::debug!("{}: allocating {size}-byte buffer", self.config.label);
            let handle = target.allocate(size)?;
            self.resource = Some((handle, size));
        }

        let Some((handle, _)) = self.resource.as_ref() else {
            return Ok(());
        };

        for (offset, bytes) in self.layout.encoded() {
            log::trace!("{}: upload {} bytes at {offset}", self.config.label, bytes.len());
            target.upload(handle, offset, bytes)?;
        }

        Ok(())
    }
}

impl UniformBuffer<wgpu::Buffer> {
    /// [`write`](Self::write) through a [`WgpuTarget`] labelled with this buffer's label.
    pub fn write_wgpu(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<()> {
        let label = self.config.label.clone();
        let mut target = WgpuTarget::new(device, queue).with_label(&label);
        self.write(&mut target)
    }

    /// Bind group layout entry for this block with `min_binding_size` filled in.
    pub fn layout_entry(
        &self,
        binding: u32,
        visibility: wgpu::ShaderStages,
    ) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: self.min_binding_size(),
            },
            count: None,
        }
    }

    /// Whole-buffer binding, available after the first successful write.
    pub fn binding_resource(&self) -> Option<wgpu::BindingResource<'_>> {
        self.handle().map(|b| b.as_entire_binding())
    }
}
