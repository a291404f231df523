// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
//                                                                           -
//                       ****************************                        -
//                        ARITHMETIC CODING EXAMPLES                         -
//                       ****************************                        -
//                                                                           -
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
//                                                                           -
// Fast arithmetic coding implementation                                     -
// -> 32-bit variables, 32-bit product, periodic updates, table decoding     -
//                                                                           -
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
//                                                                           -
// Version 1.00  -  April 25, 2004                                           -
//                                                                           -
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
//                                                                           -
//                                  WARNING                                  -
//                                 =========                                 -
//                                                                           -
// The only purpose of this program is to demonstrate the basic principles   -
// of arithmetic coding. The original version of this code can be found in   -
// Digital Signal Compression: Principles and Practice                       -
// (Cambridge University Press, 2011, ISBN: 9780511984655)                   -
//                                                                           -
// Copyright (c) 2019 by Amir Said (said@ieee.org) &                         -
//                       William A. Pearlman (pearlw@ecse.rpi.edu)           -
//                                                                           -
// Redistribution and use in source and binary forms, with or without        -
// modification, are permitted provided that the following conditions are    -
// met:                                                                      -
//                                                                           -
// 1. Redistributions of source code must retain the above copyright notice, -
// this list of conditions and the following disclaimer.                     -
//                                                                           -
// 2. Redistributions in binary form must reproduce the above copyright      -
// notice, this list of conditions and the following disclaimer in the       -
// documentation and/or other materials provided with the distribution.      -
//                                                                           -
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS       -
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED -
// TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A           -
// PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER -
// OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,  -
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,       -
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR        -
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF    -
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING      -
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS        -
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.              -
//                                                                           -
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -
//                                                                           -
// A description of the arithmetic coding method used here is available in   -
//                                                                           -
// Lossless Compression Handbook, ed. K. Sayood                              -
// Chapter 5: Arithmetic Coding (A. Said), pp. 101-152, Academic Press, 2003 -
//                                                                           -
// A. Said, Introduction to Arithetic Coding Theory and Practice             -
// HP Labs report HPL-2004-76  -  http://www.hpl.hp.com/techreports/         -
//                                                                           -
// - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -

use byteorder::{BigEndian, ByteOrder};

use crate::errors::FastAcError;
use crate::models::{AdaptiveBitModel, AdaptiveModel, StaticBitModel, StaticModel};
use crate::models::{BM_LENGTH_SHIFT, DM_LENGTH_SHIFT};

// maximum AC interval length
pub const AC_MAX_LENGTH: u32 = 0xFFFF_FFFF;
// threshold for renormalization
pub const AC_MIN_LENGTH: u32 = 0x0100_0000;
// bit-width cap on raw put/get bits
pub const AC_MAX_BITS: u32 = 20;

const MIN_BUFFER_SIZE: usize = 16;
const MAX_BUFFER_SIZE: usize = 0x0100_0000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum CoderMode {
    Idle,
    Encoding,
    Decoding,
}

/// Encoder and decoder over one in-memory code buffer.
///
/// The codec keeps the coding interval `[base, base + length)` in 32-bit
/// state and renormalizes one byte at a time once `length` drops below
/// [`AC_MIN_LENGTH`]. Bytes already emitted stay addressable until
/// [`stop_encoder`](ArithmeticCodec::stop_encoder) so that interval
/// overflows can carry into them.
///
/// Every coding call must be matched by the same call sequence on the
/// decoding side, against models in the same state.
pub struct ArithmeticCodec {
    mode: CoderMode,

    base: u32,
    value: u32,
    length: u32,

    code_buffer: Vec<u8>,
    buffer_size: usize,
    // next write position while encoding, last read position while decoding
    ac_offset: usize,
}

impl ArithmeticCodec {
    /// A codec without a code buffer; call [`set_buffer`](Self::set_buffer)
    /// before starting it.
    pub fn new() -> Self {
        Self {
            mode: CoderMode::Idle,
            base: 0,
            value: 0,
            length: 0,
            code_buffer: Vec::new(),
            buffer_size: 0,
            ac_offset: 0,
        }
    }

    pub fn with_buffer(max_code_bytes: usize) -> Result<Self, FastAcError> {
        let mut codec = Self::new();
        codec.set_buffer(max_code_bytes)?;
        Ok(codec)
    }

    /// Sets up an internally allocated code buffer of `max_code_bytes`
    /// usable bytes. A previous allocation is reused when large enough.
    pub fn set_buffer(&mut self, max_code_bytes: usize) -> Result<(), FastAcError> {
        assert!(
            self.mode == CoderMode::Idle,
            "cannot set buffer while encoding or decoding"
        );
        if max_code_bytes < MIN_BUFFER_SIZE || max_code_bytes > MAX_BUFFER_SIZE {
            return Err(FastAcError::InvalidBufferSize(max_code_bytes));
        }
        // 16 spare bytes keep the final renormalization and the decoder
        // read-ahead inside the allocation
        if self.code_buffer.len() < max_code_bytes + 16 {
            self.code_buffer = vec![0u8; max_code_bytes + 16];
        }
        self.buffer_size = max_code_bytes;
        Ok(())
    }

    /// Hands the codec a caller-owned code buffer, replacing any previous
    /// one. The buffer is used as-is: when decoding, it must keep at least
    /// 3 readable bytes past the compressed data.
    pub fn set_user_buffer(&mut self, buffer: Vec<u8>) -> Result<(), FastAcError> {
        assert!(
            self.mode == CoderMode::Idle,
            "cannot set buffer while encoding or decoding"
        );
        if buffer.len() < MIN_BUFFER_SIZE || buffer.len() > MAX_BUFFER_SIZE {
            return Err(FastAcError::InvalidBufferSize(buffer.len()));
        }
        self.buffer_size = buffer.len();
        self.code_buffer = buffer;
        Ok(())
    }

    /// The usable part of the code buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.code_buffer[..self.buffer_size]
    }

    /// Takes the code buffer out of the codec, leaving it bufferless.
    pub fn take_buffer(&mut self) -> Vec<u8> {
        assert!(
            self.mode == CoderMode::Idle,
            "cannot take buffer while encoding or decoding"
        );
        self.buffer_size = 0;
        std::mem::replace(&mut self.code_buffer, Vec::new())
    }

    pub fn start_encoder(&mut self) {
        assert!(self.mode == CoderMode::Idle, "encoder already started");
        assert!(self.buffer_size != 0, "no code buffer set");
        self.mode = CoderMode::Encoding;
        self.base = 0;
        self.length = AC_MAX_LENGTH;
        self.ac_offset = 0;
    }

    /// Flushes the last interval and returns the number of code bytes used.
    pub fn stop_encoder(&mut self) -> u32 {
        assert!(self.mode == CoderMode::Encoding, "encoder not started");
        self.mode = CoderMode::Idle;

        // done encoding: set final data bytes
        let init_base = self.base;
        if self.length > 2 * AC_MIN_LENGTH {
            // base offset
            self.base = self.base.wrapping_add(AC_MIN_LENGTH);
            // set new length for 1 more byte
            self.length = AC_MIN_LENGTH >> 1;
        } else {
            // base offset
            self.base = self.base.wrapping_add(AC_MIN_LENGTH >> 1);
            // set new length for 2 more bytes
            self.length = AC_MIN_LENGTH >> 9;
        }

        if init_base > self.base {
            // overflow = carry
            self.propagate_carry();
        }
        self.renorm_enc_interval();

        assert!(self.ac_offset <= self.buffer_size, "code buffer overflow");
        self.ac_offset as u32
    }

    pub fn start_decoder(&mut self) {
        assert!(self.mode == CoderMode::Idle, "decoder already started");
        assert!(self.buffer_size != 0, "no code buffer set");
        self.mode = CoderMode::Decoding;
        self.length = AC_MAX_LENGTH;
        // the byte at the initial read position is consumed here, further
        // renormalizations read one position ahead
        self.ac_offset = 3;
        self.value = BigEndian::read_u32(&self.code_buffer[..4]);
    }

    pub fn stop_decoder(&mut self) {
        assert!(self.mode == CoderMode::Decoding, "decoder not started");
        self.mode = CoderMode::Idle;
    }

    pub fn encode_adaptive(&mut self, sym: u32, model: &mut AdaptiveModel) {
        debug_assert!(self.mode == CoderMode::Encoding);
        debug_assert!(sym <= model.last_symbol);

        let init_base = self.base;

        // compute products
        if sym == model.last_symbol {
            let x = model.distribution[sym as usize] * (self.length >> DM_LENGTH_SHIFT);
            // update interval
            self.base = self.base.wrapping_add(x);
            // no product needed
            self.length -= x;
        } else {
            self.length >>= DM_LENGTH_SHIFT;
            let x = model.distribution[sym as usize] * self.length;
            self.base = self.base.wrapping_add(x);
            self.length = model.distribution[sym as usize + 1] * self.length - x;
        }

        if init_base > self.base {
            // overflow = carry
            self.propagate_carry();
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }

        model.symbol_count[sym as usize] += 1;
        model.symbols_until_update -= 1;
        if model.symbols_until_update == 0 {
            // the encoder never reads the decoder table
            model.update(true);
        }
    }

    pub fn decode_adaptive(&mut self, model: &mut AdaptiveModel) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);

        let mut sym;
        let mut n;
        let mut x;
        let mut y = self.length;

        if !model.decoder_table.is_empty() {
            // use table look-up for faster decoding
            self.length >>= DM_LENGTH_SHIFT;
            let dv = self.value / self.length;
            let t = (dv >> model.table_shift) as usize;

            // initial decision based on table look-up
            sym = model.decoder_table[t];
            n = model.decoder_table[t + 1] + 1;

            while n > sym + 1 {
                // finish with bisection search
                let k = (sym + n) >> 1;
                if model.distribution[k as usize] > dv {
                    n = k;
                } else {
                    sym = k;
                }
            }
            // compute products
            x = model.distribution[sym as usize] * self.length;
            if sym != model.last_symbol {
                y = model.distribution[sym as usize + 1] * self.length;
            }
        } else {
            // decode using only bisection search
            x = 0;
            sym = 0;
            self.length >>= DM_LENGTH_SHIFT;
            n = model.symbols;
            let mut k = n >> 1;

            loop {
                let z = self.length * model.distribution[k as usize];
                if z > self.value {
                    // value is smaller
                    n = k;
                    y = z;
                } else {
                    // value is larger or equal
                    sym = k;
                    x = z;
                }
                k = (sym + n) >> 1;
                if k == sym {
                    break;
                }
            }
        }

        // update interval
        self.value -= x;
        self.length = y - x;

        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }

        model.symbol_count[sym as usize] += 1;
        model.symbols_until_update -= 1;
        if model.symbols_until_update == 0 {
            model.update(false);
        }
        sym
    }

    pub fn encode_static(&mut self, sym: u32, model: &StaticModel) {
        debug_assert!(self.mode == CoderMode::Encoding);
        debug_assert!(sym <= model.last_symbol);

        let init_base = self.base;

        // compute products
        if sym == model.last_symbol {
            let x = model.distribution[sym as usize] * (self.length >> DM_LENGTH_SHIFT);
            // update interval
            self.base = self.base.wrapping_add(x);
            // no product needed
            self.length -= x;
        } else {
            self.length >>= DM_LENGTH_SHIFT;
            let x = model.distribution[sym as usize] * self.length;
            self.base = self.base.wrapping_add(x);
            self.length = model.distribution[sym as usize + 1] * self.length - x;
        }

        if init_base > self.base {
            // overflow = carry
            self.propagate_carry();
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }
    }

    pub fn decode_static(&mut self, model: &StaticModel) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);

        let mut sym;
        let mut n;
        let mut x;
        let mut y = self.length;

        if !model.decoder_table.is_empty() {
            // use table look-up for faster decoding
            self.length >>= DM_LENGTH_SHIFT;
            let dv = self.value / self.length;
            let t = (dv >> model.table_shift) as usize;

            // initial decision based on table look-up
            sym = model.decoder_table[t];
            n = model.decoder_table[t + 1] + 1;

            while n > sym + 1 {
                // finish with bisection search
                let k = (sym + n) >> 1;
                if model.distribution[k as usize] > dv {
                    n = k;
                } else {
                    sym = k;
                }
            }
            // compute products
            x = model.distribution[sym as usize] * self.length;
            if sym != model.last_symbol {
                y = model.distribution[sym as usize + 1] * self.length;
            }
        } else {
            // decode using only bisection search
            x = 0;
            sym = 0;
            self.length >>= DM_LENGTH_SHIFT;
            n = model.symbols;
            let mut k = n >> 1;

            loop {
                let z = self.length * model.distribution[k as usize];
                if z > self.value {
                    // value is smaller
                    n = k;
                    y = z;
                } else {
                    // value is larger or equal
                    sym = k;
                    x = z;
                }
                k = (sym + n) >> 1;
                if k == sym {
                    break;
                }
            }
        }

        // update interval
        self.value -= x;
        self.length = y - x;

        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }
        sym
    }

    pub fn encode_bit(&mut self, bit: u32, model: &mut AdaptiveBitModel) {
        debug_assert!(self.mode == CoderMode::Encoding);
        debug_assert!(bit <= 1);

        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);

        // update interval
        if bit == 0 {
            self.length = x;
            model.bit_0_count += 1;
        } else {
            let init_base = self.base;
            self.base = self.base.wrapping_add(x);
            self.length -= x;
            if init_base > self.base {
                // overflow = carry
                self.propagate_carry();
            }
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }

        model.bits_until_update -= 1;
        if model.bits_until_update == 0 {
            model.update();
        }
    }

    pub fn decode_bit(&mut self, model: &mut AdaptiveBitModel) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);

        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);
        let bit = u32::from(self.value >= x);

        // update interval
        if bit == 0 {
            self.length = x;
            model.bit_0_count += 1;
        } else {
            self.value -= x;
            self.length -= x;
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }

        model.bits_until_update -= 1;
        if model.bits_until_update == 0 {
            model.update();
        }
        bit
    }

    pub fn encode_bit_static(&mut self, bit: u32, model: &StaticBitModel) {
        debug_assert!(self.mode == CoderMode::Encoding);
        debug_assert!(bit <= 1);

        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);

        // update interval
        if bit == 0 {
            self.length = x;
        } else {
            let init_base = self.base;
            self.base = self.base.wrapping_add(x);
            self.length -= x;
            if init_base > self.base {
                // overflow = carry
                self.propagate_carry();
            }
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }
    }

    pub fn decode_bit_static(&mut self, model: &StaticBitModel) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);

        // product l x p0
        let x = model.bit_0_prob * (self.length >> BM_LENGTH_SHIFT);
        let bit = u32::from(self.value >= x);

        // update interval
        if bit == 0 {
            self.length = x;
        } else {
            self.value -= x;
            self.length -= x;
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }
        bit
    }

    /// Writes one bit without probability modelling.
    pub fn put_bit(&mut self, bit: u32) {
        debug_assert!(self.mode == CoderMode::Encoding);
        debug_assert!(bit <= 1);

        // new interval base and length
        self.length >>= 1;
        if bit != 0 {
            let init_base = self.base;
            self.base = self.base.wrapping_add(self.length);
            if init_base > self.base {
                // overflow = carry
                self.propagate_carry();
            }
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }
    }

    pub fn get_bit(&mut self) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);

        // decode symbol, change length
        self.length >>= 1;
        let bit = u32::from(self.value >= self.length);

        // update interval
        if bit != 0 {
            self.value -= self.length;
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }
        bit
    }

    /// Writes the `bits` low bits of `data` without probability modelling.
    pub fn put_bits(&mut self, data: u32, bits: u32) {
        debug_assert!(self.mode == CoderMode::Encoding);
        assert!(bits >= 1 && bits <= AC_MAX_BITS, "invalid number of bits");
        assert!(data < (1u32 << bits), "data wider than bit count");

        let init_base = self.base;
        // new interval base and length
        self.length >>= bits;
        self.base = self.base.wrapping_add(data * self.length);

        if init_base > self.base {
            // overflow = carry
            self.propagate_carry();
        }
        if self.length < AC_MIN_LENGTH {
            self.renorm_enc_interval();
        }
    }

    pub fn get_bits(&mut self, bits: u32) -> u32 {
        debug_assert!(self.mode == CoderMode::Decoding);
        assert!(bits >= 1 && bits <= AC_MAX_BITS, "invalid number of bits");

        // decode symbol, change length
        self.length >>= bits;
        let sym = self.value / self.length;

        // update interval
        self.value -= sym * self.length;

        if self.length < AC_MIN_LENGTH {
            self.renorm_dec_interval();
        }
        sym
    }

    // Add 1 at a higher-order position already emitted: walk back through
    // the written bytes, turning 0xFF into 0x00 until one byte absorbs the
    // carry. The first bytes of a stream are always below 0xFF, which
    // bounds the walk.
    fn propagate_carry(&mut self) {
        let mut p = self.ac_offset - 1;
        while self.code_buffer[p] == 0xFF {
            self.code_buffer[p] = 0;
            p -= 1;
        }
        self.code_buffer[p] += 1;
    }

    fn renorm_enc_interval(&mut self) {
        // output and discard top byte
        loop {
            self.code_buffer[self.ac_offset] = (self.base >> 24) as u8;
            self.ac_offset += 1;
            self.base <<= 8;
            // length multiplied by 256
            self.length <<= 8;
            if self.length >= AC_MIN_LENGTH {
                break;
            }
        }
    }

    fn renorm_dec_interval(&mut self) {
        // read least-significant bytes into the value window
        loop {
            self.ac_offset += 1;
            self.value = (self.value << 8) | u32::from(self.code_buffer[self.ac_offset]);
            // length multiplied by 256
            self.length <<= 8;
            if self.length >= AC_MIN_LENGTH {
                break;
            }
        }
    }
}

impl Default for ArithmeticCodec {
    fn default() -> Self {
        Self::new()
    }
}
