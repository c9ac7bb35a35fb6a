//! Format decoded values for display (scalars, hex byte runs, record trees).

use crate::value::Value;

/// Space-separated lowercase hex.
pub fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// One-line rendering of a scalar value; byte runs come out as `hex(..)`.
pub fn format_scalar(v: &Value) -> String {
    match v {
        Value::U8(x) => format!("{}", x),
        Value::U16(x) => format!("{}", x),
        Value::U32(x) => format!("{}", x),
        Value::U64(x) => format!("{}", x),
        Value::I8(x) => format!("{}", x),
        Value::I16(x) => format!("{}", x),
        Value::I32(x) => format!("{}", x),
        Value::I64(x) => format!("{}", x),
        Value::F32(x) => format!("{}", x),
        Value::F64(x) => format!("{}", x),
        Value::Bytes(b) => format!("hex({})", hex_string(b)),
        other => format!("{:?}", other),
    }
}

/// Multi-line rendering of a value tree. Struct keys are sorted so the
/// output is deterministic.
pub fn dump_value(v: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match v {
        Value::Struct(m) => {
            let mut lines = vec![format!("{}{{", pad)];
            let mut keys: Vec<_> = m.keys().collect();
            keys.sort();
            for k in keys {
                let sub = dump_value(&m[k], indent + 1);
                lines.push(format!("{}  {}: {}", pad, k, sub.trim_start()));
            }
            lines.push(format!("{}}}", pad));
            lines.join("\n")
        }
        Value::List(items) => {
            if items.is_empty() {
                return format!("{}[]", pad);
            }
            let mut lines = vec![format!("{}[", pad)];
            for (i, item) in items.iter().enumerate() {
                let sub = dump_value(item, indent + 1);
                lines.push(format!("{}  [{}] {}", pad, i, sub.trim_start()));
            }
            lines.push(format!("{}]", pad));
            lines.join("\n")
        }
        scalar => format!("{}{}", pad, format_scalar(scalar)),
    }
}
