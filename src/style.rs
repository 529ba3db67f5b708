//! Caret-code text formatting for terminal clients.
//!
//! Text handed to a session may carry two-character caret codes (`^R`,
//! `^~`, ...) that map to xterm-style ANSI escape sequences. Clients that
//! negotiated an ANSI-capable terminal get the escapes; everyone else gets
//! the codes stripped. `^^` escapes a literal caret.

/// Caret code to ANSI escape sequence table.
pub const ANSI_CODES: &[(&str, &str)] = &[
    ("^k", "\x1b[22;30m"), // black
    ("^K", "\x1b[1;30m"),  // bright black (grey)
    ("^r", "\x1b[22;31m"), // red
    ("^R", "\x1b[1;31m"),  // bright red
    ("^g", "\x1b[22;32m"), // green
    ("^G", "\x1b[1;32m"),  // bright green
    ("^y", "\x1b[22;33m"), // yellow
    ("^Y", "\x1b[1;33m"),  // bright yellow
    ("^b", "\x1b[22;34m"), // blue
    ("^B", "\x1b[1;34m"),  // bright blue
    ("^m", "\x1b[22;35m"), // magenta
    ("^M", "\x1b[1;35m"),  // bright magenta
    ("^c", "\x1b[22;36m"), // cyan
    ("^C", "\x1b[1;36m"),  // bright cyan
    ("^w", "\x1b[22;37m"), // white
    ("^W", "\x1b[1;37m"),  // bright white
    ("^0", "\x1b[40m"),    // black background
    ("^1", "\x1b[41m"),    // red background
    ("^2", "\x1b[42m"),    // green background
    ("^3", "\x1b[43m"),    // yellow background
    ("^4", "\x1b[44m"),    // blue background
    ("^5", "\x1b[45m"),    // magenta background
    ("^6", "\x1b[46m"),    // cyan background
    ("^d", "\x1b[39m"),    // default foreground
    ("^I", "\x1b[7m"),     // inverse text on
    ("^i", "\x1b[27m"),    // inverse text off
    ("^~", "\x1b[0m"),     // reset all
    ("^U", "\x1b[4m"),     // underline on
    ("^u", "\x1b[24m"),    // underline off
    ("^!", "\x1b[1m"),     // bold on
    ("^.", "\x1b[22m"),    // bold off
    ("^s", "\x1b[2J"),     // clear screen
    ("^l", "\x1b[2K"),     // clear to end of line
];

/// Strip all caret codes from a string, keeping `^^` as a literal caret.
pub fn strip_caret_codes(text: &str) -> String {
    // Escape ^^ out of the way so it survives the token pass.
    let mut text = text.replace("^^", "\x00");
    for (token, _) in ANSI_CODES {
        text = text.replace(token, "");
    }
    text.replace('\x00', "^")
}

/// Replace caret codes with ANSI sequences when the client wants ANSI,
/// otherwise strip them out.
pub fn colorize(text: &str, ansi: bool) -> String {
    if ansi {
        let mut text = text.replace("^^", "\x00");
        for (token, code) in ANSI_CODES {
            text = text.replace(token, code);
        }
        text.replace('\x00', "^")
    } else {
        strip_caret_codes(text)
    }
}

/// Break a block of text into lines wrapped to the given width.
///
/// Paragraphs (separated by blank lines) start with a four-space indent;
/// continuation lines get a two-space hang. `padding` columns are reserved
/// on the right.
pub fn word_wrap(text: &str, columns: usize) -> Vec<String> {
    const INDENT: usize = 4;
    const PADDING: usize = 2;

    let columns = columns.saturating_sub(PADDING);
    let mut lines = Vec::new();

    for para in split_paragraphs(text) {
        if para.trim().is_empty() {
            continue;
        }
        let mut line = " ".repeat(INDENT);
        for word in para.split_whitespace() {
            if line.len() + 1 + word.len() > columns {
                lines.push(line);
                line = " ".repeat(PADDING);
                line.push_str(word);
            } else {
                line.push(' ');
                line.push_str(word);
            }
        }
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Split on blank lines (a newline, optional whitespace, another newline).
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t' || bytes[j] == b'\r') {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'\n' {
                paragraphs.push(&text[start..i]);
                while j < bytes.len() && bytes[j] == b'\n' {
                    j += 1;
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    if start < text.len() {
        paragraphs.push(&text[start..]);
    }
    paragraphs
}
