//! Compile pattern text plus interpolated values into a [`Layout`].
//!
//! A pattern is an ordered list of text segments with template holes between
//! them; each hole is filled by a [`PatternArg`] (a repeat count after `*`,
//! or a previously compiled layout where a field is expected). Each segment
//! is tokenized with PEST and the tokens drive a two-mode state machine:
//! Field mode emits descriptors, Repeat mode attaches a count to the last
//! emitted descriptor.

use crate::layout::{ByteOrder, FieldDescriptor, FieldKind, Layout, Width};
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct PatternTokens;

/// A value interpolated into a pattern at a template hole.
#[derive(Debug, Clone)]
pub enum PatternArg {
    /// Repeat count; only valid right after `*`.
    Count(u32),
    /// Compiled layout; only valid where a field is expected. Emits a
    /// composite field wrapping the layout.
    Fields(Layout),
}

impl From<u32> for PatternArg {
    fn from(n: u32) -> Self {
        PatternArg::Count(n)
    }
}

impl From<Layout> for PatternArg {
    fn from(layout: Layout) -> Self {
        PatternArg::Fields(layout)
    }
}

impl From<&Layout> for PatternArg {
    fn from(layout: &Layout) -> Self {
        PatternArg::Fields(layout.clone())
    }
}

/// Compiler configuration.
///
/// `strict` gates compile-time validation only: with it off, unknown tokens
/// and mismatched interpolations are skipped, a missing leading order marker
/// defaults to big-endian, and a zero repeat count is dropped. The codecs'
/// shape checks are not affected.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { strict: true }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("segment {segment}, offset {offset}: invalid token '{token}', expected {expected}")]
    InvalidToken {
        segment: usize,
        offset: usize,
        token: String,
        expected: &'static str,
    },
    #[error("pattern must declare byte order with 'le' or 'be' before the first field")]
    MissingByteOrder,
    #[error("label '{0}' must be immediately followed by a field")]
    DanglingLabel(String),
    #[error("f{0} is not a supported float width")]
    UnsupportedFloatWidth(u32),
    #[error("'*' must follow a field")]
    RepeatWithoutField,
    #[error("'*' at end of pattern has no repeat count")]
    DanglingRepeat,
    #[error("repeat count must be at least 1")]
    ZeroRepeat,
    #[error("interpolated value {index}: expected {expected}")]
    ArgMismatch { index: usize, expected: &'static str },
    #[error("pattern has {holes} interpolation hole(s) but {args} value(s) were supplied")]
    ArgCount { holes: usize, args: usize },
}

/// Compile a hole-free pattern.
pub fn parse(pattern: &str) -> Result<Layout, PatternError> {
    compile(&[pattern], Vec::new())
}

/// Compile text segments interleaved with interpolated values, with strict
/// validation. `segments` has exactly one more element than `args`; `args[i]`
/// fills the hole between `segments[i]` and `segments[i + 1]`.
pub fn compile(segments: &[&str], args: Vec<PatternArg>) -> Result<Layout, PatternError> {
    compile_with(segments, args, CompileOptions::default())
}

/// Compile with explicit options.
pub fn compile_with(
    segments: &[&str],
    args: Vec<PatternArg>,
    options: CompileOptions,
) -> Result<Layout, PatternError> {
    let holes = segments.len().saturating_sub(1);
    if options.strict && args.len() != holes {
        return Err(PatternError::ArgCount {
            holes,
            args: args.len(),
        });
    }

    let mut machine = Machine::new(options.strict);
    let mut args = args.into_iter();
    for (i, segment) in segments.iter().enumerate() {
        machine.consume_segment(i, segment)?;
        if i + 1 < segments.len() {
            if let Some(arg) = args.next() {
                machine.consume_arg(i, arg)?;
            }
        }
    }
    machine.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Field,
    Repeat,
}

/// The parsing state machine. The pending label and current byte order are
/// explicit state, carried across segment boundaries.
struct Machine {
    strict: bool,
    mode: Mode,
    order: Option<ByteOrder>,
    pending_label: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl Machine {
    fn new(strict: bool) -> Self {
        Machine {
            strict,
            mode: Mode::Field,
            order: None,
            pending_label: None,
            fields: Vec::new(),
        }
    }

    fn consume_segment(&mut self, index: usize, text: &str) -> Result<(), PatternError> {
        let mut pairs = match PatternTokens::parse(Rule::segment, text) {
            Ok(p) => p,
            // The grammar has a catch-all token, so this only fires on input
            // pest itself rejects.
            Err(e) => {
                if self.strict {
                    return Err(PatternError::InvalidToken {
                        segment: index,
                        offset: 0,
                        token: e.to_string(),
                        expected: "a pattern token",
                    });
                }
                return Ok(());
            }
        };
        let root = match pairs.next() {
            Some(p) => p,
            None => return Ok(()),
        };
        for pair in root.into_inner() {
            if pair.as_rule() == Rule::EOI {
                continue;
            }
            self.consume_token(index, pair)?;
        }
        Ok(())
    }

    fn consume_token(
        &mut self,
        segment: usize,
        pair: pest::iterators::Pair<Rule>,
    ) -> Result<(), PatternError> {
        let offset = pair.as_span().start();
        let text = pair.as_str().to_string();
        match self.mode {
            Mode::Field => match pair.as_rule() {
                Rule::order => {
                    self.check_no_pending_label()?;
                    self.order = Some(if text == "le" {
                        ByteOrder::Little
                    } else {
                        ByteOrder::Big
                    });
                    Ok(())
                }
                Rule::bytes_kw => self.emit(FieldKind::Bytes),
                Rule::num_type => {
                    let (family, bits) = text.split_at(1);
                    // The grammar only admits 8/16/32/64 here.
                    let width = Width::from_bits(bits.parse().unwrap_or(0)).unwrap_or(Width::W8);
                    let kind = match family {
                        "f" => {
                            if width == Width::W8 {
                                if self.strict {
                                    return Err(PatternError::UnsupportedFloatWidth(8));
                                }
                                return Ok(());
                            }
                            FieldKind::Float(width)
                        }
                        "s" => FieldKind::SignedInt(width),
                        _ => FieldKind::UnsignedInt(width),
                    };
                    self.emit(kind)
                }
                Rule::label => {
                    let name = pair
                        .into_inner()
                        .next()
                        .map(|p| p.as_str().to_string())
                        .unwrap_or_else(|| text.trim_end_matches(':').to_string());
                    self.check_no_pending_label()?;
                    self.pending_label = Some(name);
                    Ok(())
                }
                Rule::star => {
                    self.check_no_pending_label()?;
                    if self.fields.is_empty() {
                        if self.strict {
                            return Err(PatternError::RepeatWithoutField);
                        }
                        return Ok(());
                    }
                    self.mode = Mode::Repeat;
                    Ok(())
                }
                _ => self.reject(segment, offset, &text, "a field declaration"),
            },
            Mode::Repeat => match pair.as_rule() {
                Rule::number => match text.parse::<u32>() {
                    Ok(count) => self.set_repeat(count),
                    Err(_) => self.reject(segment, offset, &text, "a repeat count"),
                },
                _ => self.reject(segment, offset, &text, "a repeat count"),
            },
        }
    }

    fn consume_arg(&mut self, index: usize, arg: PatternArg) -> Result<(), PatternError> {
        match (self.mode, arg) {
            (Mode::Field, PatternArg::Fields(layout)) => self.emit(FieldKind::Composite(layout)),
            (Mode::Repeat, PatternArg::Count(n)) => self.set_repeat(n),
            (Mode::Field, PatternArg::Count(_)) => {
                if self.strict {
                    return Err(PatternError::ArgMismatch {
                        index,
                        expected: "a compiled layout",
                    });
                }
                Ok(())
            }
            (Mode::Repeat, PatternArg::Fields(_)) => {
                if self.strict {
                    return Err(PatternError::ArgMismatch {
                        index,
                        expected: "a repeat count",
                    });
                }
                Ok(())
            }
        }
    }

    /// In strict mode a pending label makes any non-field token a hard
    /// error; lax mode leaves it buffered for the next emitted field.
    fn check_no_pending_label(&mut self) -> Result<(), PatternError> {
        if self.strict {
            if let Some(label) = self.pending_label.take() {
                return Err(PatternError::DanglingLabel(label));
            }
        }
        Ok(())
    }

    /// Emit one descriptor, consuming the pending label and freezing the
    /// byte order current at this point.
    fn emit(&mut self, kind: FieldKind) -> Result<(), PatternError> {
        let byte_order = match self.order {
            Some(o) => o,
            None => {
                if self.strict {
                    return Err(PatternError::MissingByteOrder);
                }
                // Lax fallback: an undeclared order reads as big-endian.
                ByteOrder::Big
            }
        };
        self.fields.push(FieldDescriptor {
            label: self.pending_label.take(),
            kind,
            byte_order,
            repeat: None,
        });
        Ok(())
    }

    fn set_repeat(&mut self, count: u32) -> Result<(), PatternError> {
        self.mode = Mode::Field;
        if count == 0 {
            if self.strict {
                return Err(PatternError::ZeroRepeat);
            }
            return Ok(());
        }
        if let Some(last) = self.fields.last_mut() {
            last.repeat = Some(count);
        }
        Ok(())
    }

    fn reject(
        &mut self,
        segment: usize,
        offset: usize,
        token: &str,
        expected: &'static str,
    ) -> Result<(), PatternError> {
        if self.strict {
            return Err(PatternError::InvalidToken {
                segment,
                offset,
                token: token.to_string(),
                expected,
            });
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Layout, PatternError> {
        if self.strict {
            if let Some(label) = self.pending_label.take() {
                return Err(PatternError::DanglingLabel(label));
            }
            if self.mode == Mode::Repeat {
                return Err(PatternError::DanglingRepeat);
            }
        }
        Ok(Layout::new(self.fields))
    }
}
