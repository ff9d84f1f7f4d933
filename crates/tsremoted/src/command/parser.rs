use std::str::SplitWhitespace;

/// Fixed first segment of every command word.
pub const WIRE_PREFIX: &str = "ts3";

/// Positional arguments of a command, in order.
pub type Arguments<'a> = SplitWhitespace<'a>;

/// One parsed input line, borrowing from the line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    word: &'a str,
    category: &'a str,
    action: &'a str,
    tail: &'a str,
}

impl<'a> Command<'a> {
    /// Parses a line, returning `None` when it does not carry the wire prefix.
    ///
    /// Missing category or action segments come back as empty strings;
    /// segments after the action are ignored.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let trimmed = line.trim_start();
        let word_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let (word, tail) = trimmed.split_at(word_end);

        let mut segments = word.split('.');
        if segments.next()? != WIRE_PREFIX {
            return None;
        }
        let category = segments.next().unwrap_or_default();
        let action = segments.next().unwrap_or_default();

        Some(Self {
            word,
            category,
            action,
            tail,
        })
    }

    /// The full command word as the client typed it.
    #[must_use]
    pub fn word(&self) -> &'a str {
        self.word
    }

    /// Second segment of the command word; empty when omitted.
    #[must_use]
    pub fn category(&self) -> &'a str {
        self.category
    }

    /// Third segment of the command word; empty when omitted.
    #[must_use]
    pub fn action(&self) -> &'a str {
        self.action
    }

    /// Whitespace-delimited positional arguments.
    #[must_use]
    pub fn args(&self) -> Arguments<'a> {
        self.tail.split_whitespace()
    }

    /// Text following the first `skip` positional arguments.
    ///
    /// The whitespace run separating it from the preceding token is dropped;
    /// everything after that, including inner and trailing spacing, is
    /// returned verbatim. Used for free-text final arguments.
    #[must_use]
    pub fn rest_after(&self, skip: usize) -> &'a str {
        let mut rest = self.tail;
        for _ in 0..skip {
            let token = rest.trim_start();
            let end = token.find(char::is_whitespace).unwrap_or(token.len());
            rest = &token[end..];
        }
        rest.trim_start()
    }
}
