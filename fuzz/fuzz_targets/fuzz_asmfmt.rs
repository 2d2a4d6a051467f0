#![no_main]
use asmgen::asmfmt::{format_source, FormatOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, only return Ok/Err.
    let opts = FormatOptions::default();
    let Ok(out) = format_source(data, &opts) else {
        return;
    };
    assert!(out.is_empty() || out.ends_with(b"\n"));

    // A second pass accepts the output and leaves it unchanged.
    assert_eq!(format_source(&out, &opts), Ok(out.clone()));

    // The same bytes through the decorator.
    let emit = |_: &[()]| -> Result<Vec<u8>, asmgen::GenError> { Ok(data.to_vec()) };
    let g = asmgen::asmfmt(emit, opts.clone());
    let _ = asmgen::Generator::generate(&g, &[]);
});
