//! TXT 记录的引号编码
//!
//! Providers that store TXT data as a single string use the zone-file
//! convention: one or more double-quoted segments separated by spaces, with
//! `"` and `\` escaped by a backslash.

/// Longest character-string a single TXT segment may hold.
pub const MAX_SEGMENT_LEN: usize = 255;

/// Encode `text` as space-separated quoted segments of at most 255 bytes each.
pub fn encode_quoted(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }

    let mut segments = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(MAX_SEGMENT_LEN);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        segments.push(quote(chunk));
        rest = tail;
    }
    segments.join(" ")
}

fn quote(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 2);
    out.push('"');
    for c in segment.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Parse quoted segments back into their unescaped contents.
///
/// A value that does not start with a quote is taken verbatim as one segment.
pub fn parse_quoted(raw: &str) -> Result<Vec<String>, String> {
    let s = raw.trim();
    if !s.starts_with('"') {
        return Ok(vec![s.to_string()]);
    }

    let mut segments = Vec::new();
    let mut chars = s.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some('"') => {}
            Some(c) => return Err(format!("unexpected character {c:?} outside quotes")),
        }

        let mut segment = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => segment.push(escaped),
                    None => return Err("dangling escape at end of value".to_string()),
                },
                '"' => {
                    closed = true;
                    break;
                }
                _ => segment.push(c),
            }
        }
        if !closed {
            return Err("unterminated quoted string".to_string());
        }
        segments.push(segment);
    }

    Ok(segments)
}
