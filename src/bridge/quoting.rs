//! Shell and AppleScript quoting
//!
//! The privileged path hands a single command line to the OS elevation
//! primitive, so every argument is wrapped in POSIX single quotes. Inside
//! single quotes nothing is special except the closing quote, which is
//! written as `'\''` (close, escaped quote, reopen).

/// Quote one argument so a POSIX shell reads it back as exactly one word
pub fn quote_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote and space-join a full command line
pub fn command_line<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| quote_arg(part.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text for embedding in an AppleScript double-quoted string literal
pub fn applescript_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}
