//! # bytepat — byte-layout patterns and codec
//!
//! A small pattern language for declaring fixed-layout binary records, plus
//! two codec surfaces over the compiled layout: flat/positional and
//! labeled/nested-record. Compile once, then size/read/write any number of
//! buffers at any offset.
//!
//! ## Pattern syntax
//!
//! - **Byte order**: `le` / `be`, required before the first field; may be
//!   switched mid-pattern (each field keeps the order current at its
//!   declaration).
//! - **Types**: `f16|f32|f64` (floats), `s8|s16|s32|s64` (signed),
//!   `u8|u16|u32|u64` (unsigned), `bytes` (raw byte run).
//! - **Labels**: `name:` immediately before a field; unlabeled fields are
//!   positional-only padding in struct mode.
//! - **Repeat**: `*N` after a field, or `*` followed by an interpolated
//!   count.
//! - **Composition**: interpolating a compiled [`Layout`] where a field is
//!   expected nests it as a composite field.
//!
//! ## Example
//!
//! ```
//! use bytepat::{parse, read_flat, read_struct, write_struct, Value};
//! use std::collections::HashMap;
//!
//! let layout = parse("be x:u8 y:u32 z:u8").unwrap();
//! assert_eq!(layout.size_in_bytes(), 6);
//!
//! let mut buf = vec![0u8; layout.size_in_bytes()];
//! let mut record = HashMap::new();
//! record.insert("x".to_string(), Value::U8(1));
//! record.insert("y".to_string(), Value::U32(2));
//! record.insert("z".to_string(), Value::U8(3));
//! write_struct(&mut buf, &layout, &record, 0).unwrap();
//!
//! let back = read_struct(&buf, &layout, 0).unwrap();
//! assert_eq!(back.get("y"), Some(&Value::U32(2)));
//!
//! let flat = read_flat(&buf, &layout, 0).unwrap();
//! assert_eq!(flat.values, vec![Value::U8(1), Value::U32(2), Value::U8(3)]);
//! ```
//!
//! Nested layouts compose through interpolation:
//!
//! ```
//! use bytepat::{compile, parse, PatternArg};
//!
//! let vec3 = parse("le x:f32 y:f32 z:f32").unwrap();
//! let triangle = compile(
//!     &["le normal:", " vertices:", "*3 flags:u16"],
//!     vec![PatternArg::from(&vec3), PatternArg::from(&vec3)],
//! )
//! .unwrap();
//! assert_eq!(triangle.size_in_bytes(), 12 + 36 + 2);
//! ```

pub mod codec;
pub mod dump;
pub mod f16;
pub mod layout;
pub mod lint;
pub mod parser;
pub mod value;

pub use codec::{read_flat, read_struct, write_flat, write_struct, CodecError, FlatValues};
pub use layout::{ByteOrder, FieldDescriptor, FieldKind, Layout, Width};
pub use lint::{lint, LintMessage, LintRule};
pub use parser::{compile, compile_with, parse, CompileOptions, PatternArg, PatternError};
pub use value::Value;
