//! Human-facing record codes
//!
//! A code is `<prefix><sequence><suffix>`, where the suffix is a few random
//! characters, each a digit or an upper-case letter with equal chance. The
//! sequence is an atomic counter so concurrent registrations never share a
//! sequence number.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_PREFIX: &str = "100";
pub const DEFAULT_SUFFIX_LEN: usize = 2;

/// Issues record codes such as `1007K3`.
#[derive(Debug)]
pub struct RecordCodeGenerator {
    prefix: String,
    sequence: AtomicU64,
    suffix_len: usize,
}

impl RecordCodeGenerator {
    /// Prefix `100`, sequence starting at 1, two random characters.
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_PREFIX, 1, DEFAULT_SUFFIX_LEN)
    }

    pub fn with_settings(prefix: impl Into<String>, start: u64, suffix_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: AtomicU64::new(start),
            suffix_len,
        }
    }

    /// Next code, using the thread-local RNG for the suffix.
    pub fn next_code(&self) -> String {
        self.next_code_with(&mut rand::thread_rng())
    }

    /// Next code, drawing the suffix from `rng`.
    pub fn next_code_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut code = format!("{}{}", self.prefix, sequence);
        code.extend((0..self.suffix_len).map(|_| random_symbol(rng)));
        code
    }

    /// Sequence number the next code will use
    pub fn peek_sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl Default for RecordCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn random_symbol<R: Rng + ?Sized>(rng: &mut R) -> char {
    if rng.gen_bool(0.5) {
        char::from(b'0' + rng.gen_range(0..10u8))
    } else {
        char::from(b'A' + rng.gen_range(0..26u8))
    }
}
