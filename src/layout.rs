//! Field descriptor model: the compiled form of a pattern, plus sizing.

/// Multi-byte encoding order, frozen into each field at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Bit width of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    pub fn from_bits(bits: u32) -> Option<Width> {
        match bits {
            8 => Some(Width::W8),
            16 => Some(Width::W16),
            32 => Some(Width::W32),
            64 => Some(Width::W64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }
}

/// What one field holds.
///
/// `Bytes` is an uninterpreted run; its length is the field's repeat count
/// (one byte when absent). `Composite` owns a nested layout outright, so the
/// descriptor tree has no back-references.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// IEEE-754 float. W32/W64 are native; W16 is half-precision, widened to
    /// f32 on decode. W8 never gets past the compiler.
    Float(Width),
    /// Two's-complement signed integer.
    SignedInt(Width),
    /// Plain binary unsigned integer.
    UnsignedInt(Width),
    /// Raw byte run, no numeric interpretation.
    Bytes,
    /// Nested layout.
    Composite(Layout),
}

/// One layout element.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Present fields participate in struct-mode coding; absent fields are
    /// positional-only (struct mode skips their bytes).
    pub label: Option<String>,
    pub kind: FieldKind,
    /// The order in effect at the point the field was declared.
    pub byte_order: ByteOrder,
    /// Occurrence count; `None` means exactly one. Always >= 1 when present.
    pub repeat: Option<u32>,
}

impl FieldDescriptor {
    fn repeat_count(&self) -> usize {
        self.repeat.unwrap_or(1) as usize
    }

    /// Byte length of this field including its repeat.
    pub fn size_in_bytes(&self) -> usize {
        let unit = match &self.kind {
            FieldKind::Float(w) | FieldKind::SignedInt(w) | FieldKind::UnsignedInt(w) => w.bytes(),
            FieldKind::Bytes => 1,
            FieldKind::Composite(inner) => inner.size_in_bytes(),
        };
        unit * self.repeat_count()
    }

    /// How many positional slots this field occupies in flat coding.
    /// A byte run is a single slot carrying the whole segment.
    pub fn flat_slot_count(&self) -> usize {
        match &self.kind {
            FieldKind::Bytes => 1,
            FieldKind::Composite(inner) => inner.flat_slot_count() * self.repeat_count(),
            _ => self.repeat_count(),
        }
    }
}

/// A compiled pattern: an ordered, immutable list of field descriptors.
///
/// Built only by [`crate::parser::compile`] and friends; reused across any
/// number of size/read/write calls, including concurrently (it is never
/// mutated after compilation).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    fields: Vec<FieldDescriptor>,
}

impl Layout {
    pub(crate) fn new(fields: Vec<FieldDescriptor>) -> Self {
        Layout { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total byte length of one record of this layout.
    pub fn size_in_bytes(&self) -> usize {
        self.fields.iter().map(FieldDescriptor::size_in_bytes).sum()
    }

    /// Total positional slot count for flat coding.
    pub fn flat_slot_count(&self) -> usize {
        self.fields.iter().map(FieldDescriptor::flat_slot_count).sum()
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
