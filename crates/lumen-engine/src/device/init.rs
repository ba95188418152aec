/// Initialization parameters for the headless GPU context.
///
/// Keep this structure minimal. Add flags only when a concrete backend
/// requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick an adapter from.
    pub backends: wgpu::Backends,

    /// Adapter preference when several are available.
    pub power_preference: wgpu::PowerPreference,

    /// Force a software adapter (useful in CI without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Uniform packing needs none; keep empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// `max_uniform_buffer_binding_size` bounds the largest uniform block.
    pub required_limits: wgpu::Limits,

    /// Debug label for the logical device.
    pub label: String,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            label: "lumen-engine device".to_string(),
        }
    }
}
