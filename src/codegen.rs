use anyhow::{ensure, Result};
use rand::Rng;

/// Default alphabet: the 62-character alphanumeric set.
pub const DEFAULT_ALPHABET: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default code length. 62^7 ≈ 3.5 trillion slots.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Produces fixed-length candidate codes drawn uniformly at random from a
/// fixed alphabet.
///
/// The generator makes no uniqueness promise — collision detection belongs to
/// the store, which retries allocation against a fresh candidate. Alphabet
/// and length are deployment-wide constants supplied at startup.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl CodeGenerator {
    pub fn new(alphabet: &str, length: usize) -> Result<Self> {
        ensure!(!alphabet.is_empty(), "code alphabet must not be empty");
        ensure!(length > 0, "code length must be at least 1");
        Ok(Self {
            alphabet: alphabet.chars().collect(),
            length,
        })
    }

    /// Generator with the 62-character alphanumeric alphabet and length 7.
    pub fn alphanumeric() -> Self {
        Self::new(DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH)
            .expect("default alphabet is valid")
    }

    /// Draw one candidate code. Pure sampling — no I/O, no side effects.
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }

    pub fn length(&self) -> usize {
        self.length
    }
}
