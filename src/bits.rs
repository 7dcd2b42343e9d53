//! The bit-level boundary the codecs read from and write to.
//!
//! Bits travel most-significant first: a byte written through
//! [`BitSink::write_byte`] comes back out of [`BitSource::read_byte`] as the
//! same value, never bit-reversed.

use crate::error::{Error, Result};
use bitvec::prelude::*;
use std::io::{self, Read, Write};

/// Something that accepts bits one at a time.
pub trait BitSink {
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Writes all eight bits of `byte`, most significant first.
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        for shift in (0..8).rev() {
            self.write_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }
}

/// Something that yields bits one at a time.
pub trait BitSource {
    fn read_bit(&mut self) -> Result<bool>;

    /// Reads eight bits and assembles them most significant first.
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit()? as u8;
        }
        Ok(byte)
    }
}

impl<T: BitSink + ?Sized> BitSink for &mut T {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        (**self).write_bit(bit)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }
}

impl<T: BitSource + ?Sized> BitSource for &mut T {
    fn read_bit(&mut self) -> Result<bool> {
        (**self).read_bit()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }
}

impl BitSink for BitVec<u8, Msb0> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.push(bit);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.extend_from_bitslice(byte.view_bits::<Msb0>());
        Ok(())
    }
}

/// Reads bits out of a borrowed bit slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self { bits, position: 0 }
    }

    /// Reads every bit of `bytes`, including any trailing padding.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::new(bytes.view_bits())
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }
}

impl BitSource for BitReader<'_> {
    fn read_bit(&mut self) -> Result<bool> {
        match self.bits.get(self.position) {
            Some(bit) => {
                self.position += 1;
                Ok(*bit)
            }
            None => Err(Error::Exhausted {
                position: self.position,
            }),
        }
    }
}

/// Packs bits into bytes and hands each full byte to a writer.
///
/// A partially filled byte is only written by [`flush`](Self::flush) or
/// [`finish`](Self::finish), padded with zero bits. Dropping the writer
/// discards it.
#[derive(Debug)]
pub struct IoBitWriter<W: Write> {
    inner: W,
    buffer: u8,
    filled: u8,
}

impl<W: Write> IoBitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: 0,
            filled: 0,
        }
    }

    /// Pads the pending byte (if any), writes it, and flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        if self.filled > 0 {
            let byte = self.buffer << (8 - self.filled);
            self.inner.write_all(&[byte])?;
            self.buffer = 0;
            self.filled = 0;
        }
        self.inner.flush()?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> BitSink for IoBitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.filled += 1;
        if self.filled == 8 {
            self.inner.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.filled = 0;
        }
        Ok(())
    }
}

/// Pulls bytes from a reader and yields their bits.
#[derive(Debug)]
pub struct IoBitReader<R: Read> {
    inner: R,
    current: u8,
    // bits of `current` not yet handed out
    left: u8,
    position: usize,
}

impl<R: Read> IoBitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            left: 0,
            position: 0,
        }
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> BitSource for IoBitReader<R> {
    fn read_bit(&mut self) -> Result<bool> {
        if self.left == 0 {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(Error::Exhausted {
                        position: self.position,
                    });
                }
                Err(e) => return Err(e.into()),
            }
            self.current = byte[0];
            self.left = 8;
        }

        self.left -= 1;
        self.position += 1;
        Ok((self.current >> self.left) & 1 == 1)
    }
}
