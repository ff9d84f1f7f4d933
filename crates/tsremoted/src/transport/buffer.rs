//! Inbound and outbound byte buffers owned by the control channel.
//!
//! Both buffers are growable byte vectors with a monotonic consumption
//! offset. Consumed bytes are compacted away once they make up at least half
//! of the allocation, so a long-lived connection never accumulates garbage.

/// Terminator appended to every line written to the client.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Marker prefixed to every line written to the client.
pub const OUTPUT_MARKER: char = '>';

/// Unconsumed bytes received from the client.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    bytes: Vec<u8>,
    consumed: usize,
    discarding: bool,
}

impl ReadBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends freshly received bytes.
    ///
    /// While a discarded line is still arriving, bytes up to and including
    /// its terminating `\n` are dropped instead.
    pub fn extend(&mut self, chunk: &[u8]) {
        let mut chunk = chunk;
        if self.discarding {
            let Some(newline) = chunk.iter().position(|byte| *byte == b'\n') else {
                return;
            };
            chunk = &chunk[newline + 1..];
            self.discarding = false;
        }
        self.bytes.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete line, if any.
    ///
    /// The `\n` terminator and any preceding `\r` are dropped, tabs become
    /// spaces, and remaining ASCII control characters are stripped. A partial
    /// trailing line stays buffered for the next call.
    pub fn next_line(&mut self) -> Option<String> {
        let pending = &self.bytes[self.consumed..];
        let newline = pending.iter().position(|byte| *byte == b'\n')?;
        let line = sanitise_line(&pending[..newline]);
        self.consumed += newline + 1;
        self.compact();
        Some(line)
    }

    /// Drops the buffered partial line along with the rest of it when it
    /// eventually arrives.
    pub fn discard_partial_line(&mut self) {
        self.bytes.clear();
        self.consumed = 0;
        self.discarding = true;
    }

    /// Whether the remainder of a discarded line is still being skipped.
    #[must_use]
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Length of the buffered, not yet terminated input.
    #[must_use]
    pub fn unconsumed_len(&self) -> usize {
        self.bytes.len() - self.consumed
    }

    /// Drops everything buffered, including any partial line.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.consumed = 0;
        self.discarding = false;
    }

    fn compact(&mut self) {
        if self.consumed == self.bytes.len() {
            self.bytes.clear();
            self.consumed = 0;
        } else if self.consumed * 2 >= self.bytes.len() {
            self.bytes.drain(..self.consumed);
            self.consumed = 0;
        }
    }
}

fn sanitise_line(raw: &[u8]) -> String {
    let cleaned: Vec<u8> = raw
        .iter()
        .filter_map(|byte| match *byte {
            b'\t' => Some(b' '),
            byte if byte.is_ascii_control() => None,
            byte => Some(byte),
        })
        .collect();
    String::from_utf8_lossy(&cleaned).into_owned()
}

/// Outbound lines waiting for the client socket to accept them.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
    consumed: usize,
}

impl ResponseBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one response line framed as `>` + text + `\r\n`.
    ///
    /// Embedded carriage returns and line feeds are replaced with spaces so a
    /// single call always produces exactly one wire line.
    pub fn push_line(&mut self, text: &str) {
        self.bytes.reserve(text.len() + 3);
        let mut marker = [0_u8; 4];
        self.bytes
            .extend_from_slice(OUTPUT_MARKER.encode_utf8(&mut marker).as_bytes());
        self.bytes.extend(
            text.bytes()
                .map(|byte| if matches!(byte, b'\r' | b'\n') { b' ' } else { byte }),
        );
        self.bytes.extend_from_slice(LINE_TERMINATOR.as_bytes());
    }

    /// Bytes not yet handed to the socket.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.bytes[self.consumed..]
    }

    /// Number of bytes not yet handed to the socket.
    #[must_use]
    pub fn unconsumed_len(&self) -> usize {
        self.bytes.len() - self.consumed
    }

    /// Returns `true` when nothing is waiting to be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unconsumed_len() == 0
    }

    /// Marks `count` pending bytes as written.
    pub fn consume(&mut self, count: usize) {
        self.consumed = (self.consumed + count).min(self.bytes.len());
        if self.consumed == self.bytes.len() {
            self.clear();
        } else if self.consumed * 2 >= self.bytes.len() {
            self.bytes.drain(..self.consumed);
            self.consumed = 0;
        }
    }

    /// Drops every pending byte.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.consumed = 0;
    }

    /// Drains the pending bytes as lines with marker and terminator removed.
    ///
    /// Useful to embedders that route responses somewhere other than the
    /// socket, and to tests.
    pub fn take_lines(&mut self) -> Vec<String> {
        let text = String::from_utf8_lossy(self.pending()).into_owned();
        self.clear();
        text.split_terminator(LINE_TERMINATOR)
            .map(|line| line.strip_prefix(OUTPUT_MARKER).unwrap_or(line).to_string())
            .collect()
    }
}
