//! Common-indentation removal for submitted source.
//!
//! Code pasted from an editor often arrives indented as a block. Before
//! lexing, the longest whitespace prefix shared by every non-blank line is
//! removed, and whitespace-only lines are reduced to their line break.

/// Leading spaces and tabs of `line`.
fn margin_of(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Longest common prefix of two margins.
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Remove the common leading whitespace from every line of `source`.
pub fn dedent(source: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let m = margin_of(line);
        margin = Some(match margin {
            None => m,
            Some(prev) => common_prefix(prev, m),
        });
    }
    let margin = margin.unwrap_or("");

    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let (content, ending) = match line.strip_suffix("\r\n") {
            Some(c) => (c, "\r\n"),
            None => match line.strip_suffix('\n') {
                Some(c) => (c, "\n"),
                None => (line, ""),
            },
        };
        if content.trim().is_empty() {
            out.push_str(ending);
        } else {
            out.push_str(content.strip_prefix(margin).unwrap_or(content));
            out.push_str(ending);
        }
    }
    out
}

#[cfg(test)]
mod tests;
