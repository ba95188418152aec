use std::fmt;

/// A value that can be stored in a uniform buffer slot.
///
/// The set of shapes is closed: scalars, float vectors and a 4x4 float matrix.
/// Matrices are stored column-major, matching WGSL `mat4x4<f32>`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    U32(u32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

/// Discriminant of a [`UniformValue`].
///
/// Owns the size and alignment tables used by the layout packer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Required byte alignment of an entry of this kind.
    ///
    /// Follows the WGSL uniform address space rules: `vec3` aligns like `vec4`,
    /// and a matrix aligns to its column type.
    #[inline]
    pub const fn align(self) -> u64 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 | Self::Mat4 => 16,
        }
    }

    /// Encoded size in bytes.
    ///
    /// `vec3` occupies 12 bytes; the trailing 4 bytes of its 16-byte slot stay
    /// available to a following scalar.
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }

    /// WGSL spelling of the type, used in diagnostics.
    pub const fn wgsl_name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::Vec2 => "vec2<f32>",
            Self::Vec3 => "vec3<f32>",
            Self::Vec4 => "vec4<f32>",
            Self::Mat4 => "mat4x4<f32>",
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wgsl_name())
    }
}

impl UniformValue {
    #[inline]
    pub const fn kind(&self) -> UniformKind {
        match self {
            Self::F32(_) => UniformKind::F32,
            Self::I32(_) => UniformKind::I32,
            Self::U32(_) => UniformKind::U32,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Raw bytes of the value, tightly packed in native (little-endian on all
    /// wgpu targets) order. Length always equals `self.kind().size()`.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::F32(v) => bytemuck::bytes_of(v),
            Self::I32(v) => bytemuck::bytes_of(v),
            Self::U32(v) => bytemuck::bytes_of(v),
            Self::Vec2(v) => bytemuck::cast_slice(v),
            Self::Vec3(v) => bytemuck::cast_slice(v),
            Self::Vec4(v) => bytemuck::cast_slice(v),
            Self::Mat4(v) => bytemuck::cast_slice(v),
        }
    }
}

// ── conversions ───────────────────────────────────────────────────────────

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

/// Column-major 4x4 matrix.
impl From<[f32; 16]> for UniformValue {
    fn from(v: [f32; 16]) -> Self {
        Self::Mat4(v)
    }
}

impl From<glam::Vec2> for UniformValue {
    fn from(v: glam::Vec2) -> Self {
        Self::Vec2(v.to_array())
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(v: glam::Vec3) -> Self {
        Self::Vec3(v.to_array())
    }
}

impl From<glam::Vec4> for UniformValue {
    fn from(v: glam::Vec4) -> Self {
        Self::Vec4(v.to_array())
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(m: glam::Mat4) -> Self {
        Self::Mat4(m.to_cols_array())
    }
}
