//! Character cursor over already-materialized input.

/// A cursor over the input text with one-character lookahead.
///
/// The scanner tracks 1-based line and column numbers for error reporting
/// and a token start mark for [`Scanner::capture`].
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    mark: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            position: 0,
            line: 1,
            column: 1,
            mark: 0,
        }
    }

    /// The character under the cursor.
    pub fn current(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// The character after the one under the cursor.
    pub fn peek(&self) -> Option<char> {
        self.peek_nth(1)
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.position..].chars().nth(n)
    }

    /// Steps over one character.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Steps over one character and the whitespace run after it.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.bump();
        self.skip_whitespace();
        ch
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Length of the run of `ch` starting at the cursor.
    pub fn count_run(&self, ch: char) -> usize {
        self.input[self.position..]
            .chars()
            .take_while(|&c| c == ch)
            .count()
    }

    /// Sets the token start to the current position.
    pub fn mark(&mut self) {
        self.mark = self.position;
    }

    /// Text from the last [`Scanner::mark`] up to the cursor.
    pub fn capture(&self) -> &'a str {
        &self.input[self.mark..self.position]
    }

    /// Current `(line, column)`.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// The rest of the current line, used to quote context in syntax errors.
    pub fn line_context(&self) -> &'a str {
        let start = self.input[..self.position]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = self.input[self.position..]
            .find('\n')
            .map(|i| self.position + i)
            .unwrap_or(self.input.len());
        &self.input[start..end]
    }
}
