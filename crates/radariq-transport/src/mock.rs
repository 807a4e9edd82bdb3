//! Scripted in-memory link for tests.
//!
//! The clock advances by a fixed step on every `read_byte` call, so a
//! polling loop that never receives anything still reaches its deadline.

use std::cell::Cell;
use std::collections::VecDeque;

use crate::error::Result;
use crate::traits::SerialLink;

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>>>;

/// A [`SerialLink`] backed by queues instead of a device.
pub struct MockLink {
    rx: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    logs: Vec<String>,
    clock: Cell<u64>,
    tick_ms: u64,
    responder: Option<Responder>,
}

impl MockLink {
    /// Empty link whose clock advances 1 ms per read.
    pub fn new() -> Self {
        Self::with_tick(1)
    }

    /// Empty link whose clock advances `tick_ms` per read.
    pub fn with_tick(tick_ms: u64) -> Self {
        Self {
            rx: VecDeque::new(),
            written: Vec::new(),
            logs: Vec::new(),
            clock: Cell::new(0),
            tick_ms,
            responder: None,
        }
    }

    /// Queue bytes for the receive side.
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Install a closure that sees every written block and may queue a reply.
    pub fn on_write(&mut self, responder: impl FnMut(&[u8]) -> Option<Vec<u8>> + 'static) {
        self.responder = Some(Box::new(responder));
    }

    /// Every block written so far, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Drain the write log.
    pub fn take_written(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.written)
    }

    /// Lines sent to the log sink.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Bytes still waiting on the receive side.
    pub fn rx_remaining(&self) -> usize {
        self.rx.len()
    }

    /// Current simulated time.
    pub fn now(&self) -> u64 {
        self.clock.get()
    }

    /// Move the simulated clock forward.
    pub fn advance(&self, ms: u64) {
        self.clock.set(self.clock.get().saturating_add(ms));
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink for MockLink {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.advance(self.tick_ms);
        Ok(self.rx.pop_front())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());
        if let Some(responder) = self.responder.as_mut() {
            if let Some(reply) = responder(bytes) {
                self.rx.extend(reply);
            }
        }
        Ok(())
    }

    fn millis(&self) -> u64 {
        self.clock.get()
    }

    fn log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }
}

impl std::fmt::Debug for MockLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLink")
            .field("rx_remaining", &self.rx.len())
            .field("written", &self.written.len())
            .field("clock", &self.clock.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_queued_bytes_then_none() {
        let mut link = MockLink::new();
        link.push_rx(&[1, 2]);

        assert_eq!(link.read_byte().unwrap(), Some(1));
        assert_eq!(link.read_byte().unwrap(), Some(2));
        assert_eq!(link.read_byte().unwrap(), None);
        assert_eq!(link.now(), 3);
    }

    #[test]
    fn responder_queues_reply() {
        let mut link = MockLink::new();
        link.on_write(|bytes| Some(bytes.iter().rev().copied().collect()));

        link.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(link.written(), &[vec![1, 2, 3]]);
        assert_eq!(link.rx_remaining(), 3);
        assert_eq!(link.read_byte().unwrap(), Some(3));
    }

    #[test]
    fn log_sink_is_captured() {
        let mut link = MockLink::new();
        link.log("hello");
        assert_eq!(link.logs(), &["hello".to_string()]);
    }
}
