//! Pattern compiler tests: syntax (compile success/failure), interpolation,
//! and lax-mode behavior.

use bytepat::{
    compile, compile_with, parse, ByteOrder, CompileOptions, FieldKind, PatternArg, PatternError,
    Width,
};

// ==================== Valid patterns ====================

#[test]
fn compile_empty_pattern() {
    let layout = parse("").expect("empty pattern compiles");
    assert!(layout.is_empty());
    assert_eq!(layout.size_in_bytes(), 0);
    assert_eq!(layout.flat_slot_count(), 0);
}

#[test]
fn compile_order_only() {
    let layout = parse("le").expect("compile");
    assert!(layout.is_empty());
}

#[test]
fn compile_minimal_field() {
    let layout = parse("le u8").expect("compile");
    assert_eq!(layout.len(), 1);
    let f = &layout.fields()[0];
    assert_eq!(f.kind, FieldKind::UnsignedInt(Width::W8));
    assert_eq!(f.byte_order, ByteOrder::Little);
    assert_eq!(f.repeat, None);
    assert_eq!(f.label, None);
}

#[test]
fn compile_all_type_tokens() {
    let layout = parse("be f16 f32 f64 s8 s16 s32 s64 u8 u16 u32 u64").expect("compile");
    assert_eq!(layout.len(), 11);
    assert_eq!(layout.fields()[0].kind, FieldKind::Float(Width::W16));
    assert_eq!(layout.fields()[2].kind, FieldKind::Float(Width::W64));
    assert_eq!(layout.fields()[3].kind, FieldKind::SignedInt(Width::W8));
    assert_eq!(layout.fields()[10].kind, FieldKind::UnsignedInt(Width::W64));
    assert_eq!(layout.size_in_bytes(), 2 + 4 + 8 + 1 + 2 + 4 + 8 + 1 + 2 + 4 + 8);
}

#[test]
fn compile_labels() {
    let layout = parse("le x:u8 y:f32 u16").expect("compile");
    assert_eq!(layout.fields()[0].label.as_deref(), Some("x"));
    assert_eq!(layout.fields()[1].label.as_deref(), Some("y"));
    assert_eq!(layout.fields()[2].label, None);
}

#[test]
fn compile_repeat_literal() {
    let layout = parse("le u8*3 f64*2").expect("compile");
    assert_eq!(layout.fields()[0].repeat, Some(3));
    assert_eq!(layout.fields()[1].repeat, Some(2));
    assert_eq!(layout.size_in_bytes(), 3 + 16);
}

#[test]
fn compile_bytes_keyword() {
    let layout = parse("le header:bytes*80").expect("compile");
    assert_eq!(layout.fields()[0].kind, FieldKind::Bytes);
    assert_eq!(layout.fields()[0].repeat, Some(80));
    assert_eq!(layout.size_in_bytes(), 80);
    assert_eq!(layout.flat_slot_count(), 1);
}

#[test]
fn compile_order_switch_mid_pattern() {
    let layout = parse("be x:u8 y:u32 le z:u16").expect("compile");
    assert_eq!(layout.fields()[0].byte_order, ByteOrder::Big);
    assert_eq!(layout.fields()[1].byte_order, ByteOrder::Big);
    assert_eq!(layout.fields()[2].byte_order, ByteOrder::Little);
}

#[test]
fn compile_is_whitespace_insensitive() {
    let layout = parse("le\n  x: u8\n  y: f32\n  uv: u8*2\n").expect("compile");
    assert_eq!(layout.len(), 3);
    assert_eq!(layout.fields()[2].repeat, Some(2));
}

#[test]
fn recompilation_is_structurally_equal() {
    let a = parse("be header:bytes*4 n:u32 s16*3").expect("compile");
    let b = parse("be header:bytes*4 n:u32 s16*3").expect("compile");
    assert_eq!(a, b);
}

// ==================== Interpolation ====================

#[test]
fn interpolated_repeat_count() {
    let layout = compile(&["le u8*", ""], vec![PatternArg::Count(5)]).expect("compile");
    assert_eq!(layout.fields()[0].repeat, Some(5));
}

#[test]
fn interpolated_layout_becomes_composite() {
    let inner = parse("le x:f32 y:f32 z:f32").expect("inner");
    let layout = compile(&["le position:", " flags:u16"], vec![PatternArg::from(&inner)])
        .expect("compile");
    assert_eq!(layout.len(), 2);
    let f = &layout.fields()[0];
    assert_eq!(f.label.as_deref(), Some("position"));
    match &f.kind {
        FieldKind::Composite(nested) => assert_eq!(nested, &inner),
        other => panic!("expected composite, got {:?}", other),
    }
    assert_eq!(layout.size_in_bytes(), 12 + 2);
}

#[test]
fn interpolated_composite_with_repeat() {
    let inner = parse("le x:f32 y:f32 z:f32").expect("inner");
    let layout = compile(&["le vertices:", "*3"], vec![PatternArg::from(&inner)])
        .expect("compile");
    assert_eq!(layout.fields()[0].repeat, Some(3));
    assert_eq!(layout.size_in_bytes(), 36);
    assert_eq!(layout.flat_slot_count(), 9);
}

#[test]
fn composite_keeps_inner_byte_orders() {
    let inner = parse("be v:u16").expect("inner");
    let layout = compile(&["le a:u16 nested:", ""], vec![PatternArg::from(&inner)])
        .expect("compile");
    assert_eq!(layout.fields()[0].byte_order, ByteOrder::Little);
    match &layout.fields()[1].kind {
        FieldKind::Composite(nested) => {
            assert_eq!(nested.fields()[0].byte_order, ByteOrder::Big)
        }
        other => panic!("expected composite, got {:?}", other),
    }
}

// ==================== Compile errors ====================

#[test]
fn missing_byte_order_is_rejected() {
    match parse("u8") {
        Err(PatternError::MissingByteOrder) => {}
        other => panic!("expected MissingByteOrder, got {:?}", other),
    }
}

#[test]
fn f8_is_rejected() {
    match parse("le f8") {
        Err(PatternError::UnsupportedFloatWidth(8)) => {}
        other => panic!("expected UnsupportedFloatWidth, got {:?}", other),
    }
}

#[test]
fn label_without_field_is_rejected() {
    match parse("le x:") {
        Err(PatternError::DanglingLabel(l)) => assert_eq!(l, "x"),
        other => panic!("expected DanglingLabel, got {:?}", other),
    }
    assert!(matches!(
        parse("le x: le u8"),
        Err(PatternError::DanglingLabel(_))
    ));
    assert!(matches!(
        parse("le x: y: u8"),
        Err(PatternError::DanglingLabel(_))
    ));
}

#[test]
fn stray_tokens_are_rejected() {
    assert!(matches!(
        parse("le wat"),
        Err(PatternError::InvalidToken { .. })
    ));
    assert!(matches!(
        parse("le @"),
        Err(PatternError::InvalidToken { .. })
    ));
    // A bare number is only meaningful after '*'.
    assert!(matches!(
        parse("le 5"),
        Err(PatternError::InvalidToken { .. })
    ));
}

#[test]
fn invalid_token_reports_position() {
    match parse("le u8 ?") {
        Err(PatternError::InvalidToken {
            segment,
            offset,
            token,
            ..
        }) => {
            assert_eq!(segment, 0);
            assert_eq!(offset, 6);
            assert_eq!(token, "?");
        }
        other => panic!("expected InvalidToken, got {:?}", other),
    }
}

#[test]
fn repeat_marker_needs_a_field() {
    assert!(matches!(
        parse("le *3"),
        Err(PatternError::RepeatWithoutField)
    ));
}

#[test]
fn trailing_repeat_marker_is_rejected() {
    assert!(matches!(parse("le u8*"), Err(PatternError::DanglingRepeat)));
}

#[test]
fn zero_repeat_is_rejected() {
    assert!(matches!(parse("le u8*0"), Err(PatternError::ZeroRepeat)));
    assert!(matches!(
        compile(&["le u8*", ""], vec![PatternArg::Count(0)]),
        Err(PatternError::ZeroRepeat)
    ));
}

#[test]
fn non_number_after_repeat_is_rejected() {
    assert!(matches!(
        parse("le u8*x"),
        Err(PatternError::InvalidToken { .. })
    ));
}

#[test]
fn interpolation_kind_mismatch_is_rejected() {
    let inner = parse("le u8").expect("inner");
    // A count where a field belongs.
    assert!(matches!(
        compile(&["le ", " u8"], vec![PatternArg::Count(4)]),
        Err(PatternError::ArgMismatch { index: 0, .. })
    ));
    // A layout where a count belongs.
    assert!(matches!(
        compile(&["le u8*", ""], vec![PatternArg::from(&inner)]),
        Err(PatternError::ArgMismatch { index: 0, .. })
    ));
}

#[test]
fn arg_count_mismatch_is_rejected() {
    assert!(matches!(
        compile(&["le u8"], vec![PatternArg::Count(1)]),
        Err(PatternError::ArgCount { holes: 0, args: 1 })
    ));
    assert!(matches!(
        compile(&["le u8*", ""], vec![]),
        Err(PatternError::ArgCount { holes: 1, args: 0 })
    ));
}

// ==================== Lax mode ====================

const LAX: CompileOptions = CompileOptions { strict: false };

#[test]
fn lax_mode_skips_unknown_tokens() {
    let layout = compile_with(&["le u8 wat ? u16"], vec![], LAX).expect("compile");
    assert_eq!(layout.len(), 2);
}

#[test]
fn lax_mode_defaults_to_big_endian() {
    let layout = compile_with(&["u16"], vec![], LAX).expect("compile");
    assert_eq!(layout.fields()[0].byte_order, ByteOrder::Big);
}

#[test]
fn lax_mode_drops_zero_repeat() {
    let layout = compile_with(&["le u8*0"], vec![], LAX).expect("compile");
    assert_eq!(layout.fields()[0].repeat, None);
}

#[test]
fn lax_mode_keeps_label_buffered_across_order_marker() {
    let layout = compile_with(&["le x: be u8"], vec![], LAX).expect("compile");
    assert_eq!(layout.fields()[0].label.as_deref(), Some("x"));
    assert_eq!(layout.fields()[0].byte_order, ByteOrder::Big);
}
