use std::io::Read;

/// A forward-only byte source that knows its absolute offset in the
/// resource stream. All multi-byte reads go through [`byteorder`] with
/// little-endian order; short reads surface as `UnexpectedEof`, which the
/// crate error type maps to [`Error::EndOfInput`](crate::Error::EndOfInput).
pub trait Source: Read {
    /// Absolute number of bytes consumed from the start of the resource
    /// stream. Sub-windows delegate upward, so every event carries a
    /// position usable for random-access patching.
    fn position(&self) -> u64;
}

/// Counted reader over the whole resource stream.
pub struct ResourceStream<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> ResourceStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ResourceStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read> Source for ResourceStream<R> {
    fn position(&self) -> u64 {
        self.pos
    }
}

/// A sub-source bounded to the next `remaining` bytes of its parent.
/// Reading past the bound reports end of input rather than leaking into
/// sibling chunks.
pub struct Window<'a> {
    parent: &'a mut dyn Source,
    remaining: u64,
}

impl<'a> Window<'a> {
    pub fn new(parent: &'a mut dyn Source, len: u64) -> Self {
        Self {
            parent,
            remaining: len,
        }
    }

    /// Bytes left before the window bound.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Read for Window<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let len = buf.len().min(self.remaining as usize);
        let n = self.parent.read(&mut buf[..len])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl Source for Window<'_> {
    fn position(&self) -> u64 {
        self.parent.position()
    }
}

/// Consumes exactly `n` bytes, failing with `UnexpectedEof` on a short skip.
pub fn skip_fully(r: &mut (impl Read + ?Sized), n: u64) -> std::io::Result<()> {
    if n > 0 {
        tracing::trace!("skipping {} bytes", n);
    }
    let mut buf = [0u8; 512];
    let mut remaining = n;
    while remaining > 0 {
        let len = remaining.min(buf.len() as u64) as usize;
        r.read_exact(&mut buf[..len])?;
        remaining -= len as u64;
    }
    Ok(())
}
