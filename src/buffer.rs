//! Bounds-checked cursors over the host's flat `f64` buffers.
//!
//! The host owns both buffers; the bridge never allocates or frees them. Every
//! read and write goes through one of these cursors so that a layout mistake
//! surfaces as a `BufferUnderrun`/`BufferOverrun` instead of touching memory
//! past the end of the region.

use crate::error::{DecodeError, EncodeError};

/// Number of elements in an array of `shape`, or `None` if the product
/// overflows `usize`. Shapes read from a host buffer go through this before
/// any allocation or read.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

//==================================================================================
// 1. Reader
//==================================================================================

/// A forward-only reader over an input buffer.
#[derive(Debug, Clone)]
pub struct FlatReader<'a> {
    buf: &'a [f64],
    pos: usize,
}

impl<'a> FlatReader<'a> {
    pub fn new(buf: &'a [f64]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn check(&self, needed: usize) -> Result<(), DecodeError> {
        if needed > self.remaining() {
            return Err(DecodeError::BufferUnderrun {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Reads one value and advances by 1.
    pub fn read_one(&mut self) -> Result<f64, DecodeError> {
        self.check(1)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Returns a view of the next `n` values and advances past them.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [f64], DecodeError> {
        self.check(n)?;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Advances past `n` values without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }
}

//==================================================================================
// 2. Writer
//==================================================================================

/// A forward-only writer over an output buffer.
#[derive(Debug)]
pub struct FlatWriter<'a> {
    buf: &'a mut [f64],
    pos: usize,
}

impl<'a> FlatWriter<'a> {
    pub fn new(buf: &'a mut [f64]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fails unless at least `needed` values can still be written.
    ///
    /// Codecs call this with the full record length before writing anything,
    /// so a record that does not fit leaves the buffer untouched.
    pub fn reserve(&self, needed: usize) -> Result<(), EncodeError> {
        if needed > self.remaining() {
            return Err(EncodeError::BufferOverrun {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn write_one(&mut self, value: f64) -> Result<(), EncodeError> {
        self.reserve(1)?;
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    pub fn write_slice(&mut self, values: &[f64]) -> Result<(), EncodeError> {
        self.reserve(values.len())?;
        self.buf[self.pos..self.pos + values.len()].copy_from_slice(values);
        self.pos += values.len();
        Ok(())
    }

    /// Writes every item of `values` in iteration order.
    pub fn write_iter<'v, I>(&mut self, values: I) -> Result<(), EncodeError>
    where
        I: IntoIterator<Item = &'v f64>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = values.into_iter();
        self.reserve(iter.len())?;
        let start = self.pos;
        let mut written = 0;
        for (slot, value) in self.buf[start..].iter_mut().zip(iter) {
            *slot = *value;
            written += 1;
        }
        self.pos += written;
        Ok(())
    }
}
