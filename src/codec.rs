//! Read/write compiled layouts against a byte buffer.
//!
//! Two surfaces over the same descriptor walk: the flat codec
//! ([`read_flat`]/[`write_flat`]) produces/consumes an ordered value
//! sequence and ignores labels except as a side map; the struct codec
//! ([`read_struct`]/[`write_struct`]) produces/consumes keyed records and
//! recurses into composites. Both start at a caller-supplied offset, advance
//! a cursor field by field, and honor each field's frozen byte order.

use crate::f16;
use crate::layout::{ByteOrder, FieldKind, Layout, Width};
use crate::value::Value;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Out-of-bounds buffer access, propagated from the cursor. Never
    /// retried; a layout mismatch is not a transient condition.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Length mismatch: {0}")]
    LengthMismatch(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Shape: {0}")]
    Shape(String),
}

/// Flat read result: the positional sequence plus a label side map.
///
/// The side map is a convenience projection (repeated fields become lists,
/// labeled composites become the list of their spliced values; labels inside
/// composites do not bubble up). The canonical nested form is what
/// [`read_struct`] returns.
#[derive(Debug, Clone, Default)]
pub struct FlatValues {
    pub values: Vec<Value>,
    pub labeled: HashMap<String, Value>,
}

/// Read a linear, order-preserving value sequence starting at `offset`.
pub fn read_flat(buf: &[u8], layout: &Layout, offset: usize) -> Result<FlatValues, CodecError> {
    let mut r = Cursor::new(buf);
    r.set_position(offset as u64);
    let mut out = FlatValues::default();
    read_flat_fields(&mut r, layout, &mut out.values, Some(&mut out.labeled))?;
    Ok(out)
}

/// Write a flat value sequence starting at `offset`. The sequence must have
/// exactly [`Layout::flat_slot_count`] entries; a mismatch fails before any
/// byte is written. Returns bytes written.
pub fn write_flat(
    buf: &mut [u8],
    layout: &Layout,
    values: &[Value],
    offset: usize,
) -> Result<usize, CodecError> {
    let expected = layout.flat_slot_count();
    if values.len() != expected {
        return Err(CodecError::LengthMismatch(format!(
            "layout declares {} flat slot(s), {} value(s) supplied",
            expected,
            values.len()
        )));
    }
    let mut w = Cursor::new(buf);
    w.set_position(offset as u64);
    let mut next = 0usize;
    write_flat_fields(&mut w, layout, values, &mut next)?;
    Ok((w.position() - offset as u64) as usize)
}

/// Read a keyed record starting at `offset`. Unlabeled fields consume their
/// bytes but produce nothing.
pub fn read_struct(
    buf: &[u8],
    layout: &Layout,
    offset: usize,
) -> Result<HashMap<String, Value>, CodecError> {
    let mut r = Cursor::new(buf);
    r.set_position(offset as u64);
    read_struct_fields(&mut r, layout)
}

/// Write a keyed record starting at `offset`. Every labeled field must be
/// present in `record` with the declared shape. Unlabeled fields advance the
/// cursor without writing, leaving the buffer region as it was (run
/// [`crate::lint::lint`] to catch layouts that do this). Returns bytes
/// written, skipped regions included.
pub fn write_struct(
    buf: &mut [u8],
    layout: &Layout,
    record: &HashMap<String, Value>,
    offset: usize,
) -> Result<usize, CodecError> {
    let mut w = Cursor::new(buf);
    w.set_position(offset as u64);
    write_struct_fields(&mut w, layout, record)?;
    Ok((w.position() - offset as u64) as usize)
}

fn read_flat_fields(
    r: &mut Cursor<&[u8]>,
    layout: &Layout,
    values: &mut Vec<Value>,
    mut labeled: Option<&mut HashMap<String, Value>>,
) -> Result<(), CodecError> {
    for field in layout {
        let start = values.len();
        let count = field.repeat.unwrap_or(1) as usize;
        match &field.kind {
            FieldKind::Bytes => {
                let mut run = vec![0u8; count];
                r.read_exact(&mut run)?;
                values.push(Value::Bytes(run));
            }
            FieldKind::Composite(inner) => {
                for _ in 0..count {
                    read_flat_fields(r, inner, values, None)?;
                }
            }
            kind => {
                for _ in 0..count {
                    values.push(read_scalar(r, kind, field.byte_order)?);
                }
            }
        }
        if let (Some(map), Some(label)) = (labeled.as_deref_mut(), &field.label) {
            let projected = match &field.kind {
                FieldKind::Bytes => values[start].clone(),
                FieldKind::Composite(_) => Value::List(values[start..].to_vec()),
                _ if field.repeat.is_some() => Value::List(values[start..].to_vec()),
                _ => values[start].clone(),
            };
            map.insert(label.clone(), projected);
        }
    }
    Ok(())
}

fn write_flat_fields(
    w: &mut Cursor<&mut [u8]>,
    layout: &Layout,
    values: &[Value],
    next: &mut usize,
) -> Result<(), CodecError> {
    for field in layout {
        let count = field.repeat.unwrap_or(1) as usize;
        match &field.kind {
            FieldKind::Bytes => {
                let slot = *next;
                *next += 1;
                let run = values[slot].as_bytes().ok_or_else(|| {
                    CodecError::Shape(format!("slot {}: expected a byte run", slot))
                })?;
                if run.len() != count {
                    return Err(CodecError::LengthMismatch(format!(
                        "slot {}: byte run of {} byte(s) declared, {} supplied",
                        slot,
                        count,
                        run.len()
                    )));
                }
                w.write_all(run)?;
            }
            FieldKind::Composite(inner) => {
                for _ in 0..count {
                    write_flat_fields(w, inner, values, next)?;
                }
            }
            kind => {
                for _ in 0..count {
                    let slot = *next;
                    *next += 1;
                    write_scalar(w, kind, field.byte_order, &values[slot])
                        .map_err(|e| annotate(e, &format!("slot {}", slot)))?;
                }
            }
        }
    }
    Ok(())
}

fn read_struct_fields(
    r: &mut Cursor<&[u8]>,
    layout: &Layout,
) -> Result<HashMap<String, Value>, CodecError> {
    let mut out = HashMap::new();
    for field in layout {
        let count = field.repeat.unwrap_or(1) as usize;
        let label = match &field.label {
            Some(l) => l,
            None => {
                // Padding: bytes are consumed, nothing is produced.
                let mut skipped = vec![0u8; field.size_in_bytes()];
                r.read_exact(&mut skipped)?;
                continue;
            }
        };
        let value = match &field.kind {
            FieldKind::Bytes => {
                let mut run = vec![0u8; count];
                r.read_exact(&mut run)?;
                Value::Bytes(run)
            }
            FieldKind::Composite(inner) => {
                if field.repeat.is_none() {
                    Value::Struct(read_struct_fields(r, inner)?)
                } else {
                    let mut records = Vec::with_capacity(count);
                    for _ in 0..count {
                        records.push(Value::Struct(read_struct_fields(r, inner)?));
                    }
                    Value::List(records)
                }
            }
            kind => {
                if field.repeat.is_none() {
                    read_scalar(r, kind, field.byte_order)?
                } else {
                    let mut items = Vec::with_capacity(count);
                    for _ in 0..count {
                        items.push(read_scalar(r, kind, field.byte_order)?);
                    }
                    Value::List(items)
                }
            }
        };
        // A duplicate label overwrites the earlier value here.
        out.insert(label.clone(), value);
    }
    Ok(out)
}

fn write_struct_fields(
    w: &mut Cursor<&mut [u8]>,
    layout: &Layout,
    record: &HashMap<String, Value>,
) -> Result<(), CodecError> {
    for field in layout {
        let count = field.repeat.unwrap_or(1) as usize;
        let label = match &field.label {
            Some(l) => l,
            None => {
                // Skip-and-preserve: advance past the region, write nothing.
                w.seek(SeekFrom::Current(field.size_in_bytes() as i64))?;
                continue;
            }
        };
        let value = record
            .get(label)
            .ok_or_else(|| CodecError::MissingField(label.clone()))?;
        match &field.kind {
            FieldKind::Bytes => {
                let run = value.as_bytes().ok_or_else(|| {
                    CodecError::Shape(format!("field {}: expected a byte run", label))
                })?;
                if run.len() != count {
                    return Err(CodecError::LengthMismatch(format!(
                        "field {}: byte run of {} byte(s) declared, {} supplied",
                        label,
                        count,
                        run.len()
                    )));
                }
                w.write_all(run)?;
            }
            FieldKind::Composite(inner) => {
                if field.repeat.is_none() {
                    let nested = value.as_struct().ok_or_else(|| {
                        CodecError::Shape(format!("field {}: expected a record", label))
                    })?;
                    write_struct_fields(w, inner, nested)?;
                } else {
                    let records = expect_list(value, label, count)?;
                    for item in records {
                        let nested = item.as_struct().ok_or_else(|| {
                            CodecError::Shape(format!(
                                "field {}: expected a sequence of records",
                                label
                            ))
                        })?;
                        write_struct_fields(w, inner, nested)?;
                    }
                }
            }
            kind => {
                if field.repeat.is_none() {
                    write_scalar(w, kind, field.byte_order, value)
                        .map_err(|e| annotate(e, &format!("field {}", label)))?;
                } else {
                    let items = expect_list(value, label, count)?;
                    for item in items {
                        write_scalar(w, kind, field.byte_order, item)
                            .map_err(|e| annotate(e, &format!("field {}", label)))?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn expect_list<'a>(
    value: &'a Value,
    label: &str,
    count: usize,
) -> Result<&'a [Value], CodecError> {
    let items = value
        .as_list()
        .ok_or_else(|| CodecError::Shape(format!("field {}: expected a sequence", label)))?;
    if items.len() != count {
        return Err(CodecError::LengthMismatch(format!(
            "field {}: {} element(s) declared, {} supplied",
            label,
            count,
            items.len()
        )));
    }
    Ok(items)
}

fn annotate(e: CodecError, context: &str) -> CodecError {
    match e {
        CodecError::Shape(msg) => CodecError::Shape(format!("{}: {}", context, msg)),
        other => other,
    }
}

fn read_scalar(
    r: &mut Cursor<&[u8]>,
    kind: &FieldKind,
    order: ByteOrder,
) -> Result<Value, CodecError> {
    Ok(match kind {
        FieldKind::UnsignedInt(Width::W8) => Value::U8(r.read_u8()?),
        FieldKind::UnsignedInt(Width::W16) => Value::U16(read_u16(r, order)?),
        FieldKind::UnsignedInt(Width::W32) => Value::U32(read_u32(r, order)?),
        FieldKind::UnsignedInt(Width::W64) => Value::U64(read_u64(r, order)?),
        FieldKind::SignedInt(Width::W8) => Value::I8(r.read_i8()?),
        FieldKind::SignedInt(Width::W16) => Value::I16(read_u16(r, order)? as i16),
        FieldKind::SignedInt(Width::W32) => Value::I32(read_u32(r, order)? as i32),
        FieldKind::SignedInt(Width::W64) => Value::I64(read_u64(r, order)? as i64),
        FieldKind::Float(Width::W16) => Value::F32(f16::f16_to_f32(read_u16(r, order)?)),
        FieldKind::Float(Width::W32) => Value::F32(read_f32(r, order)?),
        FieldKind::Float(Width::W64) => Value::F64(read_f64(r, order)?),
        FieldKind::Float(Width::W8) => {
            return Err(CodecError::Shape("8-bit floats are not decodable".to_string()))
        }
        FieldKind::Bytes | FieldKind::Composite(_) => {
            return Err(CodecError::Shape("not a scalar field".to_string()))
        }
    })
}

fn write_scalar(
    w: &mut Cursor<&mut [u8]>,
    kind: &FieldKind,
    order: ByteOrder,
    v: &Value,
) -> Result<(), CodecError> {
    match kind {
        FieldKind::UnsignedInt(width) => {
            let raw = v
                .as_u64()
                .ok_or_else(|| CodecError::Shape("expected an unsigned integer".to_string()))?;
            match width {
                Width::W8 => w.write_u8(raw as u8)?,
                Width::W16 => write_u16(w, order, raw as u16)?,
                Width::W32 => write_u32(w, order, raw as u32)?,
                Width::W64 => write_u64(w, order, raw)?,
            }
        }
        FieldKind::SignedInt(width) => {
            let raw = v
                .as_i64()
                .ok_or_else(|| CodecError::Shape("expected an integer".to_string()))?;
            match width {
                Width::W8 => w.write_i8(raw as i8)?,
                Width::W16 => write_u16(w, order, raw as i16 as u16)?,
                Width::W32 => write_u32(w, order, raw as i32 as u32)?,
                Width::W64 => write_u64(w, order, raw as u64)?,
            }
        }
        FieldKind::Float(width) => {
            let raw = v
                .as_f64()
                .ok_or_else(|| CodecError::Shape("expected a float".to_string()))?;
            match width {
                Width::W16 => write_u16(w, order, f16::f32_to_f16(raw as f32))?,
                Width::W32 => write_f32(w, order, raw as f32)?,
                Width::W64 => write_f64(w, order, raw)?,
                Width::W8 => {
                    return Err(CodecError::Shape("8-bit floats are not encodable".to_string()))
                }
            }
        }
        FieldKind::Bytes | FieldKind::Composite(_) => {
            return Err(CodecError::Shape("not a scalar field".to_string()))
        }
    }
    Ok(())
}

fn read_u16(r: &mut Cursor<&[u8]>, order: ByteOrder) -> std::io::Result<u16> {
    match order {
        ByteOrder::Big => r.read_u16::<BigEndian>(),
        ByteOrder::Little => r.read_u16::<LittleEndian>(),
    }
}

fn read_u32(r: &mut Cursor<&[u8]>, order: ByteOrder) -> std::io::Result<u32> {
    match order {
        ByteOrder::Big => r.read_u32::<BigEndian>(),
        ByteOrder::Little => r.read_u32::<LittleEndian>(),
    }
}

fn read_u64(r: &mut Cursor<&[u8]>, order: ByteOrder) -> std::io::Result<u64> {
    match order {
        ByteOrder::Big => r.read_u64::<BigEndian>(),
        ByteOrder::Little => r.read_u64::<LittleEndian>(),
    }
}

fn read_f32(r: &mut Cursor<&[u8]>, order: ByteOrder) -> std::io::Result<f32> {
    match order {
        ByteOrder::Big => r.read_f32::<BigEndian>(),
        ByteOrder::Little => r.read_f32::<LittleEndian>(),
    }
}

fn read_f64(r: &mut Cursor<&[u8]>, order: ByteOrder) -> std::io::Result<f64> {
    match order {
        ByteOrder::Big => r.read_f64::<BigEndian>(),
        ByteOrder::Little => r.read_f64::<LittleEndian>(),
    }
}

fn write_u16(w: &mut Cursor<&mut [u8]>, order: ByteOrder, v: u16) -> std::io::Result<()> {
    match order {
        ByteOrder::Big => w.write_u16::<BigEndian>(v),
        ByteOrder::Little => w.write_u16::<LittleEndian>(v),
    }
}

fn write_u32(w: &mut Cursor<&mut [u8]>, order: ByteOrder, v: u32) -> std::io::Result<()> {
    match order {
        ByteOrder::Big => w.write_u32::<BigEndian>(v),
        ByteOrder::Little => w.write_u32::<LittleEndian>(v),
    }
}

fn write_u64(w: &mut Cursor<&mut [u8]>, order: ByteOrder, v: u64) -> std::io::Result<()> {
    match order {
        ByteOrder::Big => w.write_u64::<BigEndian>(v),
        ByteOrder::Little => w.write_u64::<LittleEndian>(v),
    }
}

fn write_f32(w: &mut Cursor<&mut [u8]>, order: ByteOrder, v: f32) -> std::io::Result<()> {
    match order {
        ByteOrder::Big => w.write_f32::<BigEndian>(v),
        ByteOrder::Little => w.write_f32::<LittleEndian>(v),
    }
}

fn write_f64(w: &mut Cursor<&mut [u8]>, order: ByteOrder, v: f64) -> std::io::Result<()> {
    match order {
        ByteOrder::Big => w.write_f64::<BigEndian>(v),
        ByteOrder::Little => w.write_f64::<LittleEndian>(v),
    }
}
