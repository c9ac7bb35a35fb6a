//! Pattern compiler fuzz target: feed arbitrary text to the compiler.
//! The compiler must not panic; it should return Ok(Layout) or Err(PatternError).
//! Build with: cargo fuzz run pattern_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let _ = bytepat::parse(s);
    let _ = bytepat::compile_with(
        &[s],
        Vec::new(),
        bytepat::CompileOptions { strict: false },
    );
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run pattern_fuzz");
}
