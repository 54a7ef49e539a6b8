// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Monotonic read cursor over an input slice.
//!
//! All multi-byte integers on the ASTERIX wire are big-endian, and bit order
//! within a byte is MSB-first (bit index 0 of a byte region is the most
//! significant bit of byte 0). The cursor only ever advances; there is no
//! backtracking in the decoding pipeline.

use crate::Error;

/// A read cursor over a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current byte position from the start of the slice.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if at least `n` bytes are left to read.
    #[inline]
    pub fn has(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Returns the byte `offset` positions ahead without advancing.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    /// Reads the next `n` bytes and advances the position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Truncated`] if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.has(n) {
            let bytes = &self.data[self.pos..self.pos + n];
            self.pos += n;
            Ok(bytes)
        } else {
            Err(Error::Truncated {
                expected: n,
                available: self.remaining(),
            })
        }
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a big-endian 16 bit unsigned integer.
    pub fn read_u16_be(&mut self) -> Result<u16, Error> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a big-endian 24 bit unsigned integer into a `u32`.
    pub fn read_u24_be(&mut self) -> Result<u32, Error> {
        let b = self.read_bytes(3)?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Skips `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.read_bytes(n).map(|_| ())
    }
}

/// Extracts `num_bits` contiguous bits from `bytes`, starting at `start_bit`.
///
/// Bit index 0 is the most significant bit of `bytes[0]`; the extracted bits
/// are returned right-aligned in a `u32`. This is the bit order used for
/// field extraction inside data items. FSPEC presence bits follow a different
/// contract (slot bits plus a trailing FX bit) and must not be decoded with
/// this helper.
///
/// # Errors
///
/// Returns a type error for `num_bits > 32` and [`Error::Truncated`] if the
/// requested window runs past the end of `bytes`.
pub fn extract_bits(bytes: &[u8], start_bit: usize, num_bits: usize) -> Result<u32, Error> {
    if num_bits > 32 {
        return Err(Error::TypeError {
            reason: format!("cannot extract {num_bits} bits into 32"),
        });
    }
    if start_bit + num_bits > bytes.len() * 8 {
        return Err(Error::Truncated {
            expected: (start_bit + num_bits + 7) / 8,
            available: bytes.len(),
        });
    }

    let mut value = 0u32;
    for bit in start_bit..start_bit + num_bits {
        value <<= 1;
        if bytes[bit / 8] & (0x80 >> (bit % 8)) != 0 {
            value |= 1;
        }
    }
    Ok(value)
}
