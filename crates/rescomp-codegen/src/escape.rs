use std::fmt::Write;

/// Quote `s` as a C/C++ string literal made of printable ASCII only.
///
/// Everything else becomes a three-digit octal escape, which (unlike `\x`)
/// cannot swallow a following digit.
pub fn cpp_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for byte in s.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            // `??x` trigraphs
            b'?' => out.push_str("\\?"),
            b' '..=b'~' => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out.push('"');
    out
}

/// Quote `s` as a Rust string literal.
pub fn rust_string_literal(s: &str) -> String {
    format!("{s:?}")
}

/// Render bytes as comma-separated decimal rows of at most `width` values.
pub fn byte_rows(bytes: &[u8], width: usize) -> Vec<String> {
    bytes
        .chunks(width.max(1))
        .map(|row| {
            let values: Vec<String> = row.iter().map(|b| b.to_string()).collect();
            format!("{},", values.join(", "))
        })
        .collect()
}
