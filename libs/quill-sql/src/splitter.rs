use std::path::Path;

// ═══════════════════════════════════════════════════════════════
//  Statement splitter
// ═══════════════════════════════════════════════════════════════

/// Scanner state. Only one of the three modes is ever entered at a time:
/// quotes and backticks are ignored inside comments and vice versa.
#[derive(Default)]
struct Scanner {
    in_backtick: bool,
    in_quote: bool,
    in_comment: bool,
    prev: Option<char>,
}

impl Scanner {
    fn is_plain(&self) -> bool {
        !self.in_backtick && !self.in_quote && !self.in_comment
    }

    /// Feed one character. Returns `true` when it terminates a statement.
    fn step(&mut self, c: char) -> bool {
        let escaped = self.prev == Some('\\');
        let mut terminates = false;

        match c {
            '`' if !escaped && !self.in_quote && !self.in_comment => {
                self.in_backtick = !self.in_backtick;
            }
            '\'' if !escaped && !self.in_backtick && !self.in_comment => {
                self.in_quote = !self.in_quote;
            }
            '\n' => self.in_comment = false,
            ';' if self.is_plain() => terminates = true,
            '-' if self.prev == Some('-') && !self.in_backtick && !self.in_quote => {
                self.in_comment = true;
            }
            _ => {}
        }

        self.prev = Some(c);
        terminates
    }
}

/// Split SQL text into individual statements.
///
/// A `;` ends a statement unless it sits inside a single-quoted string,
/// a backtick-quoted identifier or a `--` line comment. A quote or backtick
/// preceded by `\` does not toggle its mode. Only the previous character is
/// looked at, so `'a\\'` does not close its string: the second backslash
/// still escapes the quote.
///
/// Statements are trimmed, empty ones dropped, and a trailing statement
/// without `;` is kept. Comment lines inside a statement stay in it; a
/// comment that runs up to the end of a statement is cut off, so joining the
/// result with `;` splits back to the same statements.
pub fn split(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut scanner = Scanner::default();

    for c in text.chars() {
        if scanner.step(c) {
            push_trimmed(&mut statements, &current);
            current.clear();
        } else {
            current.push(c);
        }
    }
    push_trimmed(&mut statements, &current);

    statements
}

fn push_trimmed(statements: &mut Vec<String>, buf: &str) {
    let stmt = strip_trailing_comment(buf.trim());
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}

/// Drop a `--` comment still open at the end of `stmt`.
fn strip_trailing_comment(stmt: &str) -> &str {
    let mut scanner = Scanner::default();
    let mut comment_start = None;
    for (i, c) in stmt.char_indices() {
        let was_comment = scanner.in_comment;
        scanner.step(c);
        if scanner.in_comment && !was_comment {
            // the opening `-` is one byte before the second
            comment_start = Some(i - 1);
        }
    }
    match comment_start {
        Some(start) if scanner.in_comment => stmt[..start].trim_end(),
        _ => stmt,
    }
}

/// Read a UTF-8 file and [`split`] it.
pub fn split_file(path: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let statements = split(&text);
    tracing::debug!(path = %path.display(), statements = statements.len(), "split sql file");
    Ok(statements)
}
