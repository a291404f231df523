//! Port of Amir Said's FastAC arithmetic coding to Rust
//!
//! The codec compresses a sequence of discrete symbols into a compact byte
//! stream by narrowing a 32-bit interval and emitting one byte every time
//! the interval gets too small. Probabilities come from one of two model
//! flavors: [`AdaptiveModel`] learns the distribution while coding,
//! [`StaticModel`] is fixed at construction. [`AdaptiveBitModel`] and
//! [`StaticBitModel`] are the cheaper two-symbol specializations, and the
//! codec can also write raw bits with no model at all.
//!
//! An [`ArithmeticCodec`] owns a code buffer and is driven through
//! start/stop calls; the decode side must replay the exact call sequence of
//! the encode side against models in the same initial state.
//!
//! # Examples
//!
//! ```
//! use fastac::{AdaptiveModel, ArithmeticCodec};
//!
//! # fn main() -> Result<(), fastac::FastAcError> {
//! let symbols = [0u32, 3, 3, 1, 2, 3, 0, 3];
//!
//! let mut codec = ArithmeticCodec::with_buffer(64)?;
//! let mut model = AdaptiveModel::new(4)?;
//!
//! codec.start_encoder();
//! for &sym in &symbols {
//!     codec.encode_adaptive(sym, &mut model);
//! }
//! let code_bytes = codec.stop_encoder();
//! assert!(code_bytes > 0);
//!
//! // decoding replays the same sequence against an identical model
//! model.reset();
//! codec.start_decoder();
//! for &sym in &symbols {
//!     assert_eq!(codec.decode_adaptive(&mut model), sym);
//! }
//! codec.stop_decoder();
//! # Ok(())
//! # }
//! ```
//!
//! A fixed distribution skips the model updates:
//!
//! ```
//! use fastac::{ArithmeticCodec, StaticModel};
//!
//! # fn main() -> Result<(), fastac::FastAcError> {
//! let model = StaticModel::with_probabilities(3, &[0.1, 0.1, 0.8])?;
//! let mut codec = ArithmeticCodec::with_buffer(64)?;
//!
//! codec.start_encoder();
//! for &sym in &[2u32, 2, 0, 2, 1, 2] {
//!     codec.encode_static(sym, &model);
//! }
//! codec.stop_encoder();
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod errors;
pub mod models;

pub use codec::{ArithmeticCodec, AC_MAX_BITS, AC_MAX_LENGTH, AC_MIN_LENGTH};
pub use errors::FastAcError;
pub use models::{AdaptiveBitModel, AdaptiveModel, StaticBitModel, StaticModel};
