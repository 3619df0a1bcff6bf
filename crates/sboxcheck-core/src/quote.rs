//! Shell-style rendering of test-case argv for console output.
//!
//! The rendered form doubles as the test's identity in reports, so it must
//! be reversible: [`parse_argv`] reconstructs the exact argv that
//! [`format_argv`] rendered, including arguments with embedded quotes.

/// Renders an argv for display: the first token verbatim, every later token
/// wrapped in double quotes. Embedded `"` and `\` are backslash-escaped so
/// the rendering stays unambiguous.
#[must_use]
pub fn format_argv(argv: &[String]) -> String {
    let mut out = String::new();
    for (i, arg) in argv.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        if i == 0 {
            out.push_str(arg);
        } else {
            out.push('"');
            for c in arg.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
    out
}

/// Inverts [`format_argv`].
///
/// Returns `None` if the input is not a well-formed rendering (unterminated
/// quote, dangling escape, missing separator, empty input).
#[must_use]
pub fn parse_argv(rendered: &str) -> Option<Vec<String>> {
    let mut argv = Vec::new();
    let mut chars = rendered.chars().peekable();

    // First token runs verbatim up to the first space.
    let mut first = String::new();
    while let Some(&c) = chars.peek() {
        if c == ' ' {
            break;
        }
        first.push(c);
        chars.next();
    }
    if first.is_empty() {
        return None;
    }
    argv.push(first);

    while let Some(sep) = chars.next() {
        if sep != ' ' || chars.next() != Some('"') {
            return None;
        }
        let mut arg = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('"' | '\\')) => arg.push(escaped),
                    _ => return None,
                },
                '"' => {
                    closed = true;
                    break;
                }
                _ => arg.push(c),
            }
        }
        if !closed {
            return None;
        }
        argv.push(arg);
    }

    Some(argv)
}
