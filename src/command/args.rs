/// Whitespace-separated argument stream with double-quote grouping.
#[derive(Debug, Clone)]
pub struct Args {
    input: String,
    pos: usize,
}

impl Args {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            pos: 0,
        }
    }

    /// Returns the next token and its end offset without consuming it.
    fn scan(&self) -> Option<(String, usize)> {
        let remaining = &self.input[self.pos..];
        let trimmed = remaining.trim_start();
        let start = self.pos + (remaining.len() - trimmed.len());

        if trimmed.is_empty() {
            return None;
        }

        if let Some(quoted) = trimmed.strip_prefix('"') {
            return match quoted.find('"') {
                Some(end) => Some((quoted[..end].to_string(), start + end + 2)),
                // Unterminated quote: the rest of the input is one token.
                None => Some((quoted.to_string(), self.input.len())),
            };
        }

        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        Some((trimmed[..end].to_string(), start + end))
    }

    pub fn next(&mut self) -> Option<String> {
        let (token, end) = self.scan()?;
        self.pos = end;
        Some(token)
    }

    pub fn peek(&self) -> Option<String> {
        self.scan().map(|(token, _)| token)
    }

    /// Consumes everything left as one trimmed string, `None` when nothing is left.
    pub fn rest(&mut self) -> Option<String> {
        let rest = self.input[self.pos..].trim();
        self.pos = self.input.len();

        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }

    /// Remaining tokens, consuming them.
    pub fn remaining(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.next()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.input[self.pos..].trim().is_empty()
    }
}
