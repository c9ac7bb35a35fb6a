//! Print a summary of a binary STL file, decoded through composed byte
//! patterns: an 80-byte header blob plus triangle count, then per-triangle
//! records built from a nested vector layout.

use anyhow::Context;
use bytepat::dump::{dump_value, hex_string};
use bytepat::{compile, parse, read_struct, Layout, PatternArg, Value};
use std::path::PathBuf;

fn vec3_layout() -> Result<Layout, bytepat::PatternError> {
    parse("le x:f32 y:f32 z:f32")
}

fn triangle_layout() -> Result<Layout, bytepat::PatternError> {
    let vec3 = vec3_layout()?;
    compile(
        &["le normal:", " vertices:", "*3 flags:u16"],
        vec![PatternArg::from(&vec3), PatternArg::from(&vec3)],
    )
}

fn header_layout() -> Result<Layout, bytepat::PatternError> {
    parse("le header:bytes*80 triangle_count:u32")
}

fn main() -> anyhow::Result<()> {
    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: stl_info <file.stl>")?;
    let data = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;

    let header = header_layout()?;
    let triangle = triangle_layout()?;

    let hdr = read_struct(&data, &header, 0)
        .with_context(|| format!("{}: decode header", path.display()))?;
    let count = hdr
        .get("triangle_count")
        .and_then(Value::as_u64)
        .context("header missing triangle_count")?;

    let expected = header.size_in_bytes() + count as usize * triangle.size_in_bytes();
    println!("{}", path.display());
    println!("  triangles: {}", count);
    println!(
        "  size: {} byte(s), expected {} for {} triangle(s)",
        data.len(),
        expected,
        count
    );
    if let Some(Value::Bytes(raw)) = hdr.get("header") {
        println!("  header: {}", hex_string(&raw[..16.min(raw.len())]));
    }

    if count > 0 && data.len() >= header.size_in_bytes() + triangle.size_in_bytes() {
        let first = read_struct(&data, &triangle, header.size_in_bytes())
            .with_context(|| format!("{}: decode first triangle", path.display()))?;
        println!("  first triangle:");
        println!("{}", dump_value(&Value::Struct(first), 2));
    }

    Ok(())
}
