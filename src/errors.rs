//! Definitions of error related things.

use std::fmt;

/// Errors of this crate
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FastAcError {
    /// Data models support between 2 and 2048 symbols
    InvalidAlphabetSize(u32),
    /// A per-symbol probability was outside [0, 1]
    InvalidProbability { symbol: u32, probability: f64 },
    /// The probability of a bit being 0 must leave room for both bits
    InvalidBitProbability(f64),
    /// The probabilities handed to a static model must sum to 1
    InvalidProbabilitySum(f64),
    /// Code buffers hold between 16 bytes and 16 MiB
    InvalidBufferSize(usize),
}

impl fmt::Display for FastAcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            FastAcError::InvalidAlphabetSize(n) => {
                write!(f, "Alphabet size {} is not in 2..=2048", n)
            }
            FastAcError::InvalidProbability {
                symbol,
                probability,
            } => write!(
                f,
                "Probability {} of symbol {} is not in [0, 1]",
                probability, symbol
            ),
            FastAcError::InvalidBitProbability(p0) => {
                write!(f, "Bit 0 probability {} gives one bit a zero-width interval", p0)
            }
            FastAcError::InvalidProbabilitySum(sum) => {
                write!(f, "The probabilities sum to {} instead of 1", sum)
            }
            FastAcError::InvalidBufferSize(size) => {
                write!(f, "Code buffer size {} is not in 16..=16777216", size)
            }
        }
    }
}

impl std::error::Error for FastAcError {}
