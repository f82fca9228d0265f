//! Line-level text helpers shared by the scanners.
//!
//! Matching runs over a *masked* copy of each line in which the contents of
//! string literals are blanked out. The mask preserves byte offsets, so a
//! match found in the masked line can be sliced straight out of the
//! original.

/// Marker that starts a line comment.
pub const COMMENT_MARKER: char = '#';

/// Whether the whole line is a comment.
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// Copy of `line` with the contents of string literals replaced by spaces.
///
/// Quote delimiters are kept. Each blanked character is replaced by as many
/// spaces as it has UTF-8 bytes. An unterminated literal is blanked to the
/// end of the line.
pub fn mask_strings(line: &str) -> String {
    let mut masked = String::with_capacity(line.len());
    let mut delimiter: Option<char> = None;
    let mut escaped = false;

    for ch in line.chars() {
        match delimiter {
            None => {
                if ch == '"' || ch == '\'' {
                    delimiter = Some(ch);
                }
                masked.push(ch);
            }
            Some(quote) => {
                if escaped {
                    escaped = false;
                    blank(&mut masked, ch);
                } else if ch == '\\' {
                    escaped = true;
                    blank(&mut masked, ch);
                } else if ch == quote {
                    delimiter = None;
                    masked.push(ch);
                } else {
                    blank(&mut masked, ch);
                }
            }
        }
    }

    masked
}

fn blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

/// Byte offset where code ends on a masked line (start of an inline comment).
pub fn code_end(masked: &str) -> usize {
    masked.find(COMMENT_MARKER).unwrap_or(masked.len())
}

/// Zero-based column (in characters) of a byte offset.
pub fn char_column(line: &str, byte: usize) -> u32 {
    line.char_indices().take_while(|(i, _)| *i < byte).count() as u32
}

/// Byte offset of a zero-based character column. The column one past the
/// last character maps to the line length.
pub fn byte_index(line: &str, column: u32) -> Option<usize> {
    let column = column as usize;
    line.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .nth(column)
}

/// Byte offset of the `)` that balances the `(` at `open`, if it is on the
/// same line.
pub fn closing_paren(masked: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in masked.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `masked` is a single bracketed group `open ... close` spanning the
/// whole fragment.
pub fn encloses(masked: &str, open: u8, close: u8) -> bool {
    let bytes = masked.as_bytes();
    if bytes.len() < 2 || bytes[0] != open || bytes[bytes.len() - 1] != close {
        return false;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if b == open {
            depth += 1;
        } else if b == close {
            depth = depth.saturating_sub(1);
            if depth == 0 && i != bytes.len() - 1 {
                return false;
            }
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_strings_preserves_offsets() {
        let line = r#"take s = "a # b" # note"#;
        let masked = mask_strings(line);
        assert_eq!(masked.len(), line.len());
        assert_eq!(masked, r#"take s = "     " # note"#);
        assert_eq!(code_end(&masked), 17);
    }

    #[test]
    fn test_mask_strings_escapes_and_single_quotes() {
        assert_eq!(mask_strings(r#""a\"b" x"#), r#""    " x"#);
        assert_eq!(mask_strings("'it' + y"), "'  ' + y");
        // Unterminated literal is blanked to end of line
        assert_eq!(mask_strings(r#"take s = "abc"#), r#"take s = "   "#);
    }

    #[test]
    fn test_mask_strings_multibyte() {
        let line = "take s = \"é\" + x";
        let masked = mask_strings(line);
        assert_eq!(masked.len(), line.len());
        assert!(masked.ends_with("+ x"));
    }

    #[test]
    fn test_comment_line() {
        assert!(is_comment_line("   # hello"));
        assert!(!is_comment_line("let x = 1 # trailing"));
    }

    #[test]
    fn test_columns() {
        let line = "take é = 1";
        assert_eq!(char_column(line, 5), 5);
        assert_eq!(char_column(line, 8), 7);
        assert_eq!(byte_index(line, 7), Some(8));
        assert_eq!(byte_index(line, 10), Some(line.len()));
        assert_eq!(byte_index(line, 11), None);
    }

    #[test]
    fn test_closing_paren() {
        let line = "f(a, g(b), c) + 1";
        assert_eq!(closing_paren(line, 1), Some(12));
        assert_eq!(closing_paren("f(a, (b", 1), None);
    }

    #[test]
    fn test_encloses() {
        assert!(encloses("[1, 2, [3]]", b'[', b']'));
        assert!(!encloses("[1] + [2]", b'[', b']'));
        assert!(!encloses("[1, 2", b'[', b']'));
    }
}
