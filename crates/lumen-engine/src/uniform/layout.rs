use std::collections::HashMap;

use super::error::{Result, UniformError};
use super::value::{UniformKind, UniformValue};

/// One packed slot.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Value { name: String, value: UniformValue },
    /// Zero-filled alignment gap. Byte count is one of 4, 8 or 12.
    Padding(u64),
}

#[derive(Debug, Clone, PartialEq)]
struct Packed {
    offset: u64,
    slot: Slot,
}

impl Packed {
    fn size(&self) -> u64 {
        match &self.slot {
            Slot::Value { value, .. } => value.kind().size(),
            Slot::Padding(bytes) => *bytes,
        }
    }
}

/// Read-only view of a packed slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformEntry<'a> {
    /// `None` for padding inserted by the packer.
    pub name: Option<&'a str>,
    pub offset: u64,
    pub size: u64,
    /// `None` for padding.
    pub kind: Option<UniformKind>,
}

impl UniformEntry<'_> {
    #[inline]
    pub fn is_padding(&self) -> bool {
        self.name.is_none()
    }
}

/// CPU-side uniform block layout.
///
/// Entries are placed in insertion order. Each entry's offset satisfies the
/// alignment of its kind; gaps are filled with explicit zero padding so the
/// serialized block is contiguous. Offsets never change once assigned.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    slots: Vec<Packed>,
    index: HashMap<String, usize>,
    size: u64,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named value, inserting padding first if its alignment requires it.
    ///
    /// Fails on an empty or already-used name; the layout is left untouched.
    pub fn add(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();

        if name.is_empty() {
            return Err(UniformError::EmptyName);
        }
        if self.index.contains_key(name) {
            return Err(UniformError::DuplicateName(name.to_string()));
        }

        let kind = value.kind();
        let gap = padding_for(self.size, kind.align())?;
        if gap > 0 {
            log::debug!(
                "uniform `{name}`: inserting {gap} bytes of padding at offset {} for {kind}",
                self.size
            );
            self.slots.push(Packed {
                offset: self.size,
                slot: Slot::Padding(gap),
            });
            self.size += gap;
        }

        self.index.insert(name.to_string(), self.slots.len());
        self.slots.push(Packed {
            offset: self.size,
            slot: Slot::Value {
                name: name.to_string(),
                value,
            },
        });
        self.size += kind.size();

        Ok(())
    }

    /// Replaces the value of an existing entry. The kind must match exactly.
    ///
    /// Never changes offsets or sizes.
    pub fn update(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();

        let Some(&i) = self.index.get(name) else {
            return Err(UniformError::NotFound(name.to_string()));
        };
        let Slot::Value { value: stored, .. } = &mut self.slots[i].slot else {
            // The index only ever points at value slots.
            return Err(UniformError::NotFound(name.to_string()));
        };

        if stored.kind() != value.kind() {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: stored.kind(),
                found: value.kind(),
            });
        }

        *stored = value;
        Ok(())
    }

    /// Total block size in bytes, including padding.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of slots, padding included.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let &i = self.index.get(name)?;
        match &self.slots[i].slot {
            Slot::Value { value, .. } => Some(*value),
            Slot::Padding(_) => None,
        }
    }

    pub fn offset_of(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&i| self.slots[i].offset)
    }

    /// Iterates slots in layout order.
    pub fn entries(&self) -> impl Iterator<Item = UniformEntry<'_>> + '_ {
        self.slots.iter().map(|p| match &p.slot {
            Slot::Value { name, value } => UniformEntry {
                name: Some(name.as_str()),
                offset: p.offset,
                size: p.size(),
                kind: Some(value.kind()),
            },
            Slot::Padding(bytes) => UniformEntry {
                name: None,
                offset: p.offset,
                size: *bytes,
                kind: None,
            },
        })
    }

    /// Iterates `(offset, bytes)` for every slot; padding yields zeros.
    pub(crate) fn encoded(&self) -> impl Iterator<Item = (u64, &[u8])> + '_ {
        static ZEROS: [u8; 16] = [0; 16];

        self.slots.iter().map(|p| match &p.slot {
            Slot::Value { value, .. } => (p.offset, value.as_bytes()),
            Slot::Padding(bytes) => (p.offset, &ZEROS[..*bytes as usize]),
        })
    }

    /// Serializes the whole block into `size()` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.size as usize];
        for (offset, bytes) in self.encoded() {
            let start = offset as usize;
            out[start..start + bytes.len()].copy_from_slice(bytes);
        }
        out
    }
}

/// Bytes of padding needed to bring `offset` up to `align`.
///
/// With every kind sized in multiples of 4 and aligned to 4, 8 or 16, the gap
/// is always 0, 4, 8 or 12. Anything else is rejected.
fn padding_for(offset: u64, align: u64) -> Result<u64> {
    let rem = offset % align;
    if rem == 0 {
        return Ok(0);
    }

    let gap = align - rem;
    match gap {
        4 | 8 | 12 => Ok(gap),
        _ => Err(UniformError::Alignment { offset, align, gap }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UniformLayout {
        let mut l = UniformLayout::new();
        l.add("t", 1.0f32).unwrap();
        l.add("v", [2.0f32, 3.0]).unwrap();
        l.add("m", glam::Mat4::IDENTITY).unwrap();
        l
    }

    fn f32s(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    // ── add ───────────────────────────────────────────────────────────────

    #[test]
    fn scalar_vec2_mat4_layout() {
        let l = sample();
        let entries: Vec<_> = l.entries().collect();

        assert_eq!(entries.len(), 4);
        assert_eq!((entries[0].name, entries[0].offset, entries[0].size), (Some("t"), 0, 4));
        assert!(entries[1].is_padding());
        assert_eq!((entries[1].offset, entries[1].size), (4, 4));
        assert_eq!((entries[2].name, entries[2].offset, entries[2].size), (Some("v"), 8, 8));
        assert_eq!((entries[3].name, entries[3].offset, entries[3].size), (Some("m"), 16, 64));
        assert_eq!(l.size(), 80);
    }

    #[test]
    fn padding_twelve_before_vec4() {
        let mut l = UniformLayout::new();
        l.add("a", 0u32).unwrap();
        l.add("b", [0.0f32; 4]).unwrap();

        assert_eq!(l.offset_of("b"), Some(16));
        let pad = l.entries().nth(1).unwrap();
        assert!(pad.is_padding());
        assert_eq!(pad.size, 12);
        assert_eq!(l.size(), 32);
    }

    #[test]
    fn padding_eight_before_vec3() {
        let mut l = UniformLayout::new();
        l.add("uv", [0.0f32; 2]).unwrap();
        l.add("dir", [0.0f32; 3]).unwrap();

        assert_eq!(l.offset_of("dir"), Some(16));
        assert_eq!(l.entries().nth(1).map(|e| e.size), Some(8));
        assert_eq!(l.size(), 28);
    }

    #[test]
    fn scalar_packs_after_vec3() {
        let mut l = UniformLayout::new();
        l.add("dir", [1.0f32, 0.0, 0.0]).unwrap();
        l.add("intensity", 0.5f32).unwrap();

        assert_eq!(l.offset_of("intensity"), Some(12));
        assert_eq!(l.len(), 2);
        assert_eq!(l.size(), 16);
    }

    #[test]
    fn no_padding_when_aligned() {
        let mut l = UniformLayout::new();
        l.add("a", 1i32).unwrap();
        l.add("b", 2i32).unwrap();
        l.add("c", [0.0f32; 2]).unwrap();

        assert!(l.entries().all(|e| !e.is_padding()));
        assert_eq!(l.size(), 16);
    }

    #[test]
    fn offsets_respect_alignment_and_sum_to_size() {
        let mut l = UniformLayout::new();
        let values: [UniformValue; 9] = [
            1.0f32.into(),
            [0.0f32; 3].into(),
            2u32.into(),
            [0.0f32; 2].into(),
            3i32.into(),
            glam::Mat4::IDENTITY.into(),
            4.0f32.into(),
            [0.0f32; 4].into(),
            [0.0f32; 2].into(),
        ];
        for (i, v) in values.into_iter().enumerate() {
            l.add(&format!("u{i}"), v).unwrap();
        }

        let mut expected_offset = 0;
        for e in l.entries() {
            assert_eq!(e.offset, expected_offset);
            if let Some(kind) = e.kind {
                assert_eq!(e.offset % kind.align(), 0, "{:?}", e.name);
            }
            expected_offset += e.size;
        }
        assert_eq!(l.size(), expected_offset);
    }

    #[test]
    fn duplicate_name_rejected_without_change() {
        let mut l = sample();
        let before = l.size();

        assert_eq!(
            l.add("v", [0.0f32; 4]),
            Err(UniformError::DuplicateName("v".to_string()))
        );
        assert_eq!(l.size(), before);
        assert_eq!(l.len(), 4);
    }

    #[test]
    fn empty_name_rejected() {
        let mut l = UniformLayout::new();
        assert_eq!(l.add("", 1.0f32), Err(UniformError::EmptyName));
        assert!(l.is_empty());
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn update_changes_only_target_bytes() {
        let mut l = sample();
        let before = l.to_bytes();
        let offsets: Vec<_> = l.entries().map(|e| (e.offset, e.size)).collect();

        l.update("v", glam::Vec2::new(9.0, 9.0)).unwrap();
        let after = l.to_bytes();

        assert_eq!(before.len(), after.len());
        for i in 0..after.len() {
            if !(8..16).contains(&i) {
                assert_eq!(before[i], after[i], "byte {i} changed");
            }
        }
        assert_eq!(f32s(&after[8..16]), vec![9.0, 9.0]);
        assert_eq!(offsets, l.entries().map(|e| (e.offset, e.size)).collect::<Vec<_>>());
    }

    #[test]
    fn update_kind_mismatch() {
        let mut l = sample();
        assert_eq!(
            l.update("v", [1.0f32, 2.0, 3.0]),
            Err(UniformError::TypeMismatch {
                name: "v".to_string(),
                expected: UniformKind::Vec2,
                found: UniformKind::Vec3,
            })
        );
        assert_eq!(l.get("v"), Some(UniformValue::Vec2([2.0, 3.0])));
    }

    #[test]
    fn update_signedness_mismatch() {
        let mut l = UniformLayout::new();
        l.add("count", 3u32).unwrap();
        assert!(matches!(
            l.update("count", 3i32),
            Err(UniformError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn update_missing() {
        let mut l = sample();
        assert_eq!(
            l.update("missing", 1.0f32),
            Err(UniformError::NotFound("missing".to_string()))
        );
    }

    // ── serialization ─────────────────────────────────────────────────────

    #[test]
    fn to_bytes_places_values_and_zero_padding() {
        let bytes = sample().to_bytes();

        assert_eq!(bytes.len(), 80);
        assert_eq!(f32s(&bytes[0..4]), vec![1.0]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(f32s(&bytes[8..16]), vec![2.0, 3.0]);
        assert_eq!(f32s(&bytes[16..80]), glam::Mat4::IDENTITY.to_cols_array().to_vec());
    }

    #[test]
    fn empty_layout_serializes_to_nothing() {
        let l = UniformLayout::new();
        assert_eq!(l.size(), 0);
        assert!(l.to_bytes().is_empty());
        assert_eq!(l.encoded().count(), 0);
    }

    // ── padding_for ───────────────────────────────────────────────────────

    #[test]
    fn padding_for_supported_gaps() {
        assert_eq!(padding_for(0, 16), Ok(0));
        assert_eq!(padding_for(4, 8), Ok(4));
        assert_eq!(padding_for(8, 16), Ok(8));
        assert_eq!(padding_for(4, 16), Ok(12));
    }

    #[test]
    fn padding_for_unsupported_gap() {
        assert_eq!(
            padding_for(2, 4),
            Err(UniformError::Alignment { offset: 2, align: 4, gap: 2 })
        );
    }
}
