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

use crate::errors::FastAcError;

// length bits discarded before mult.
pub(crate) const DM_LENGTH_SHIFT: u32 = 15;
// count rescale threshold for adaptive models
pub(crate) const DM_MAX_COUNT: u32 = 1 << DM_LENGTH_SHIFT;

// length bits discarded before mult.
pub(crate) const BM_LENGTH_SHIFT: u32 = 13;
// count rescale threshold for adaptive bit models
pub(crate) const BM_MAX_COUNT: u32 = 1 << BM_LENGTH_SHIFT;

fn check_alphabet(symbols: u32) -> Result<(), FastAcError> {
    if symbols < 2 || symbols > (1 << 11) {
        Err(FastAcError::InvalidAlphabetSize(symbols))
    } else {
        Ok(())
    }
}

// size and shift of the fast-decoding table for alphabets above 16 symbols
fn table_layout(symbols: u32) -> (u32, u32) {
    let mut table_bits = 3u32;
    while symbols > (1u32 << (table_bits + 2)) {
        table_bits += 1;
    }
    (1 << table_bits, DM_LENGTH_SHIFT - table_bits)
}

/// Data model that learns the symbol distribution while coding.
///
/// Counts start out uniform and are recompiled into a cumulative
/// distribution on a geometrically growing cycle, halving every count
/// whenever the total reaches the rescale threshold. Encoder and decoder
/// must drive their models through the exact same symbol sequence to stay
/// in sync.
#[derive(Debug)]
pub struct AdaptiveModel {
    pub(crate) symbols: u32,
    pub(crate) last_symbol: u32,

    pub(crate) distribution: Vec<u32>,
    pub(crate) symbol_count: Vec<u32>,
    pub(crate) decoder_table: Vec<u32>,

    pub(crate) total_count: u32,
    pub(crate) update_cycle: u32,
    pub(crate) symbols_until_update: u32,
    pub(crate) table_size: u32,
    pub(crate) table_shift: u32,
}

impl AdaptiveModel {
    pub fn new(symbols: u32) -> Result<Self, FastAcError> {
        let mut model = Self {
            symbols: 0,
            last_symbol: 0,
            distribution: Vec::new(),
            symbol_count: Vec::new(),
            decoder_table: Vec::new(),
            total_count: 0,
            update_cycle: 0,
            symbols_until_update: 0,
            table_size: 0,
            table_shift: 0,
        };
        model.set_alphabet(symbols)?;
        Ok(model)
    }

    /// Number of symbols in the alphabet.
    pub fn symbols(&self) -> u32 {
        self.symbols
    }

    /// Number of occurrences recorded for `symbol` since the last reset.
    pub fn symbol_count(&self, symbol: u32) -> u32 {
        self.symbol_count[symbol as usize]
    }

    /// Changes the alphabet size, dropping everything learned so far.
    pub fn set_alphabet(&mut self, symbols: u32) -> Result<(), FastAcError> {
        check_alphabet(symbols)?;
        if self.symbols != symbols {
            self.symbols = symbols;
            self.last_symbol = symbols - 1;

            if symbols > 16 {
                let (table_size, table_shift) = table_layout(symbols);
                self.table_size = table_size;
                self.table_shift = table_shift;
                self.decoder_table = vec![0u32; (table_size + 2) as usize];
            } else {
                // small alphabet: no table needed
                self.table_size = 0;
                self.table_shift = 0;
                self.decoder_table = Vec::new();
            }
            self.distribution = vec![0u32; symbols as usize];
            self.symbol_count = vec![0u32; symbols as usize];
        }
        self.reset();
        Ok(())
    }

    /// Restores the startup state: one occurrence per symbol.
    pub fn reset(&mut self) {
        self.total_count = 0;
        self.update_cycle = self.symbols;
        for count in &mut self.symbol_count {
            *count = 1;
        }
        self.update(false);
        self.update_cycle = (self.symbols + 6) >> 1;
        self.symbols_until_update = self.update_cycle;
    }

    pub(crate) fn update(&mut self, from_encoder: bool) {
        // halve counts when the rescale threshold is reached
        self.total_count += self.update_cycle;
        if self.total_count > DM_MAX_COUNT {
            self.total_count = 0;
            for count in &mut self.symbol_count {
                *count = (*count + 1) >> 1;
                self.total_count += *count;
            }
        }

        // compute cumulative distribution, decoder table
        let scale = 0x8000_0000u32 / self.total_count;
        let mut sum = 0u32;

        if from_encoder || self.table_size == 0 {
            for (distribution, count) in self.distribution.iter_mut().zip(&self.symbol_count) {
                *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += *count;
            }
        } else {
            let mut s = 0usize;
            for (k, (distribution, count)) in self
                .distribution
                .iter_mut()
                .zip(&self.symbol_count)
                .enumerate()
            {
                *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += *count;

                let w = (*distribution >> self.table_shift) as usize;
                while s < w {
                    s += 1;
                    self.decoder_table[s] = (k - 1) as u32;
                }
            }
            self.decoder_table[0] = 0;
            while s <= self.table_size as usize {
                s += 1;
                self.decoder_table[s] = self.symbols - 1;
            }
        }

        self.update_cycle = (5 * self.update_cycle) >> 2;
        let max_cycle = (self.symbols + 6) << 3;
        if self.update_cycle > max_cycle {
            self.update_cycle = max_cycle;
        }
        self.symbols_until_update = self.update_cycle;
    }
}

/// Data model with a distribution fixed at construction.
#[derive(Debug)]
pub struct StaticModel {
    pub(crate) symbols: u32,
    pub(crate) last_symbol: u32,

    pub(crate) distribution: Vec<u32>,
    pub(crate) decoder_table: Vec<u32>,

    pub(crate) table_size: u32,
    pub(crate) table_shift: u32,
}

impl StaticModel {
    /// Uniform distribution over `symbols` symbols.
    pub fn new(symbols: u32) -> Result<Self, FastAcError> {
        let mut model = Self::empty();
        model.set_distribution(symbols, None)?;
        Ok(model)
    }

    /// Distribution given as one probability per symbol, summing to 1.
    pub fn with_probabilities(symbols: u32, probability: &[f64]) -> Result<Self, FastAcError> {
        let mut model = Self::empty();
        model.set_distribution(symbols, Some(probability))?;
        Ok(model)
    }

    fn empty() -> Self {
        Self {
            symbols: 0,
            last_symbol: 0,
            distribution: Vec::new(),
            decoder_table: Vec::new(),
            table_size: 0,
            table_shift: 0,
        }
    }

    /// Number of symbols in the alphabet.
    pub fn symbols(&self) -> u32 {
        self.symbols
    }

    /// Rebuilds the model over `symbols` symbols, uniform when no
    /// probabilities are given.
    pub fn set_distribution(
        &mut self,
        symbols: u32,
        probability: Option<&[f64]>,
    ) -> Result<(), FastAcError> {
        check_alphabet(symbols)?;
        if let Some(probability) = probability {
            assert_eq!(
                probability.len(),
                symbols as usize,
                "one probability per symbol required"
            );
            let mut sum = 0.0f64;
            for (symbol, &p) in probability.iter().enumerate() {
                if !(0.0..=1.0).contains(&p) {
                    return Err(FastAcError::InvalidProbability {
                        symbol: symbol as u32,
                        probability: p,
                    });
                }
                sum += p;
            }
            if !(0.9999..=1.001).contains(&sum) {
                return Err(FastAcError::InvalidProbabilitySum(sum));
            }
        }

        if self.symbols != symbols {
            self.symbols = symbols;
            self.last_symbol = symbols - 1;

            if symbols > 16 {
                let (table_size, table_shift) = table_layout(symbols);
                self.table_size = table_size;
                self.table_shift = table_shift;
                self.decoder_table = vec![0u32; (table_size + 2) as usize];
            } else {
                // small alphabet: no table needed
                self.table_size = 0;
                self.table_shift = 0;
                self.decoder_table = Vec::new();
            }
            self.distribution = vec![0u32; symbols as usize];
        }

        // compute cumulative distribution, decoder table
        let uniform = 1.0 / f64::from(symbols);
        let mut sum = 0.0f64;
        let mut s = 0usize;
        for k in 0..symbols as usize {
            let p = probability.map_or(uniform, |probability| probability[k]);
            self.distribution[k] = (sum * f64::from(1u32 << DM_LENGTH_SHIFT)) as u32;
            sum += p;

            if self.table_size != 0 {
                let w = (self.distribution[k] >> self.table_shift) as usize;
                while s < w {
                    s += 1;
                    self.decoder_table[s] = (k - 1) as u32;
                }
            }
        }
        if self.table_size != 0 {
            self.decoder_table[0] = 0;
            while s <= self.table_size as usize {
                s += 1;
                self.decoder_table[s] = self.symbols - 1;
            }
        }
        Ok(())
    }
}

/// Adaptive model for the common special case of a two-symbol alphabet.
#[derive(Debug)]
pub struct AdaptiveBitModel {
    pub(crate) bit_0_count: u32,
    pub(crate) bit_count: u32,
    pub(crate) bit_0_prob: u32,
    pub(crate) bits_until_update: u32,
    pub(crate) update_cycle: u32,
}

impl AdaptiveBitModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn update(&mut self) {
        // halve counts when the rescale threshold is reached
        self.bit_count += self.update_cycle;
        if self.bit_count > BM_MAX_COUNT {
            self.bit_count = (self.bit_count + 1) >> 1;
            self.bit_0_count = (self.bit_0_count + 1) >> 1;

            if self.bit_0_count == self.bit_count {
                self.bit_count += 1;
            }
        }

        // compute scaled bit 0 probability
        let scale = 0x8000_0000u32 / self.bit_count;
        self.bit_0_prob = (self.bit_0_count * scale) >> (31 - BM_LENGTH_SHIFT);

        // set frequency of model updates
        self.update_cycle = (5 * self.update_cycle) >> 2;
        if self.update_cycle > 64 {
            self.update_cycle = 64;
        }
        self.bits_until_update = self.update_cycle;
    }
}

impl Default for AdaptiveBitModel {
    fn default() -> Self {
        // initialization to equiprobable model
        Self {
            bit_0_count: 1,
            bit_count: 2,
            bit_0_prob: 1u32 << (BM_LENGTH_SHIFT - 1),
            // start with frequent updates
            bits_until_update: 4,
            update_cycle: 4,
        }
    }
}

/// Two-symbol model with a fixed probability of the bit being 0.
#[derive(Debug)]
pub struct StaticBitModel {
    pub(crate) bit_0_prob: u32,
}

impl StaticBitModel {
    /// Equiprobable bits.
    pub fn new() -> Self {
        Self {
            bit_0_prob: 1u32 << (BM_LENGTH_SHIFT - 1),
        }
    }

    pub fn with_probability_0(p0: f64) -> Result<Self, FastAcError> {
        // both bits must keep a nonzero scaled width, so the scaled
        // probability has to land in 1..=2^13 - 1
        let bit_0_prob = (p0 * f64::from(1u32 << BM_LENGTH_SHIFT)) as u32;
        if bit_0_prob < 1 || bit_0_prob > (1 << BM_LENGTH_SHIFT) - 1 {
            return Err(FastAcError::InvalidBitProbability(p0));
        }
        Ok(Self { bit_0_prob })
    }
}

impl Default for StaticBitModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_cdf_invariants(distribution: &[u32], symbols: u32) {
        assert_eq!(distribution.len(), symbols as usize);
        assert_eq!(distribution[0], 0);
        for pair in distribution.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(*distribution.last().unwrap() < (1 << DM_LENGTH_SHIFT));
    }

    fn assert_table_brackets(distribution: &[u32], decoder_table: &[u32], table_shift: u32) {
        // every table entry must lower-bound the symbols of its value bucket
        for (t, &low) in decoder_table.iter().enumerate().skip(1) {
            let threshold = (t as u32) << table_shift;
            assert!(distribution[low as usize] <= threshold);
        }
    }

    #[test]
    fn fresh_adaptive_model_is_uniform() {
        let model = AdaptiveModel::new(16).unwrap();
        assert_cdf_invariants(&model.distribution, 16);
        for (k, &d) in model.distribution.iter().enumerate() {
            assert_eq!(d, 2048 * k as u32);
        }
        assert_eq!(model.update_cycle, 11);
        assert_eq!(model.symbols_until_update, 11);
    }

    #[test]
    fn adaptive_rebuild_keeps_invariants() {
        let mut model = AdaptiveModel::new(100).unwrap();
        // drive a skewed source through several rebuilds
        for round in 0..5000u32 {
            let sym = if round % 10 == 0 { round % 100 } else { 7 };
            model.symbol_count[sym as usize] += 1;
            model.symbols_until_update -= 1;
            if model.symbols_until_update == 0 {
                model.update(false);
                assert_cdf_invariants(&model.distribution, 100);
                assert_table_brackets(&model.distribution, &model.decoder_table, model.table_shift);
                assert!(model.symbol_count.iter().all(|&c| c >= 1));
                assert!(model.total_count <= DM_MAX_COUNT);
            }
        }
    }

    #[test]
    fn rescale_never_zeroes_a_count() {
        let mut model = AdaptiveModel::new(4).unwrap();
        // state right before a rebuild crossing the rescale threshold:
        // the pending cycle brings total_count up to the sum of counts
        model.symbol_count = vec![1, 1, 1, 32770];
        model.update_cycle = 10;
        model.total_count = 32773 - 10;
        model.update(false);
        assert_eq!(model.symbol_count, vec![1, 1, 1, 16385]);
        assert!(model.symbol_count.iter().all(|&c| c >= 1));
        assert_eq!(model.total_count, model.symbol_count.iter().sum::<u32>());
    }

    #[test]
    fn update_cycle_growth_is_capped() {
        let mut model = AdaptiveModel::new(16).unwrap();
        for _ in 0..64 {
            model.update(true);
        }
        assert_eq!(model.update_cycle, (16 + 6) << 3);
    }

    #[test]
    fn alphabet_bounds_are_enforced() {
        assert!(matches!(
            AdaptiveModel::new(1),
            Err(FastAcError::InvalidAlphabetSize(1))
        ));
        assert!(matches!(
            AdaptiveModel::new(2049),
            Err(FastAcError::InvalidAlphabetSize(2049))
        ));
        assert!(AdaptiveModel::new(2).is_ok());
        assert!(AdaptiveModel::new(2048).is_ok());
        assert!(StaticModel::new(2049).is_err());
    }

    #[test]
    fn set_alphabet_reallocates_and_resets() {
        let mut model = AdaptiveModel::new(16).unwrap();
        assert!(model.decoder_table.is_empty());
        model.set_alphabet(64).unwrap();
        assert_eq!(model.symbols(), 64);
        assert_eq!(model.last_symbol, 63);
        // 64 symbols fit a 16-entry table: 64 <= 1 << (4 + 2)
        assert_eq!(model.table_size, 16);
        assert_eq!(model.table_shift, DM_LENGTH_SHIFT - 4);
        assert_eq!(model.decoder_table.len(), 18);
        assert_cdf_invariants(&model.distribution, 64);
    }

    #[test]
    fn static_model_scales_probabilities() {
        let model = StaticModel::with_probabilities(3, &[0.1, 0.1, 0.8]).unwrap();
        assert_eq!(model.distribution, vec![0, 3276, 6553]);
    }

    #[test]
    fn static_model_table_layout_for_largest_alphabet() {
        let model = StaticModel::new(2048).unwrap();
        assert_eq!(model.table_size, 512);
        assert_eq!(model.table_shift, 6);
        assert_eq!(model.decoder_table.len(), 514);
        assert_table_brackets(&model.distribution, &model.decoder_table, model.table_shift);
    }

    #[test]
    fn static_model_rejects_bad_probabilities() {
        assert!(matches!(
            StaticModel::with_probabilities(2, &[-0.1, 1.1]),
            Err(FastAcError::InvalidProbability { symbol: 0, .. })
        ));
        assert!(matches!(
            StaticModel::with_probabilities(2, &[0.2, 0.2]),
            Err(FastAcError::InvalidProbabilitySum(_))
        ));
        assert!(matches!(
            StaticModel::with_probabilities(2, &[0.9, 0.9]),
            Err(FastAcError::InvalidProbabilitySum(_))
        ));
    }

    #[test]
    fn bit_model_update_keeps_probability_in_range() {
        let mut model = AdaptiveBitModel::new();
        for _ in 0..1000 {
            model.bit_0_count += 1;
            model.bits_until_update -= 1;
            if model.bits_until_update == 0 {
                model.update();
                assert!(model.bit_0_prob > 0);
                assert!(model.bit_0_prob < (1 << BM_LENGTH_SHIFT));
                assert!(model.bit_0_count < model.bit_count);
            }
        }
    }

    #[test]
    fn static_bit_model_probability_bounds() {
        assert!(StaticBitModel::with_probability_0(0.0).is_err());
        assert!(StaticBitModel::with_probability_0(1.0).is_err());
        // scales to a zero-width bit 0 interval
        assert!(StaticBitModel::with_probability_0(0.0001).is_err());
        let model = StaticBitModel::with_probability_0(1.0 / 8192.0).unwrap();
        assert_eq!(model.bit_0_prob, 1);
        let model = StaticBitModel::with_probability_0(0.5).unwrap();
        assert_eq!(model.bit_0_prob, 1 << (BM_LENGTH_SHIFT - 1));
    }
}
