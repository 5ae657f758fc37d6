//! String literal escape processing.

/// Resolve a single-character escape.
#[inline]
fn resolve_simple(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('"'),
        '0' => Some('\0'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0C'),
        'v' => Some('\x0B'),
        _ => None,
    }
}

/// Read `digits` hex digits following `\x`, `\u` or `\U`.
fn read_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let lookahead = chars.as_str();
    let hex = lookahead.get(..digits)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    let c = char::from_u32(code)?;
    for _ in 0..digits {
        chars.next();
    }
    Some(c)
}

/// Process escape sequences in a string body (quotes already stripped).
///
/// Unknown escapes are kept verbatim, backslash included. A backslash before
/// a line break joins the lines.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        if let Some(resolved) = resolve_simple(esc) {
            out.push(resolved);
            continue;
        }
        let resolved = match esc {
            'x' => read_hex(&mut chars, 2),
            'u' => read_hex(&mut chars, 4),
            'U' => read_hex(&mut chars, 8),
            '\n' => continue,
            '\r' => {
                if chars.as_str().starts_with('\n') {
                    chars.next();
                }
                continue;
            }
            _ => None,
        };
        match resolved {
            Some(r) => out.push(r),
            None => {
                out.push('\\');
                out.push(esc);
            }
        }
    }

    out
}
