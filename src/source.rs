use crate::error::{Result, StreamError};
use log::*;
use std::io::Read;
use std::ops::Range;

/// Something that can be read from sequentially and has to be released explicitly.
///
/// `read` fills `buf[offset..offset + len]` and returns the number of bytes written,
/// or `None` once the source has no more data.
pub trait Source {
    fn read(&mut self, buf: Option<&mut [u8]>, offset: isize, len: isize) -> Result<Option<usize>>;
    fn close(&mut self) -> Result<()>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read(&mut self, buf: Option<&mut [u8]>, offset: isize, len: isize) -> Result<Option<usize>> {
        (**self).read(buf, offset, len)
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/**
 * check that offset and len describe a window inside a buffer of the given length.
 *
 * returns the window as a range usable for slicing
 */
pub fn check_window(capacity: usize, offset: isize, len: isize) -> Result<Range<usize>> {
    let out_of_bounds = || StreamError::OutOfBounds {
        offset,
        len,
        capacity,
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let len = usize::try_from(len).map_err(|_| out_of_bounds())?;
    match start.checked_add(len) {
        Some(end) if end <= capacity => Ok(start..end),
        _ => Err(out_of_bounds()),
    }
}

/// Wraps a [`Read`] so it can be used as a [`Source`]. Closing drops the reader.
pub struct IoSource<R: Read> {
    inp: Option<R>,
}

impl<R: Read> IoSource<R> {
    pub fn new(inp: R) -> IoSource<R> {
        IoSource { inp: Some(inp) }
    }
    pub fn is_closed(&self) -> bool {
        self.inp.is_none()
    }
}

impl<R: Read> From<R> for IoSource<R> {
    fn from(inp: R) -> Self {
        IoSource::new(inp)
    }
}

impl<R: Read> Source for IoSource<R> {
    fn read(&mut self, buf: Option<&mut [u8]>, offset: isize, len: isize) -> Result<Option<usize>> {
        let buf = buf.ok_or(StreamError::InvalidArgument)?;
        let window = check_window(buf.len(), offset, len)?;
        if window.is_empty() {
            return Ok(Some(0));
        }
        let inp = match self.inp.as_mut() {
            Some(inp) => inp,
            None => return Ok(None),
        };
        match inp.read(&mut buf[window])? {
            0 => Ok(None),
            n => Ok(Some(n)),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.inp.take().is_some() {
            trace!("dropped inner reader");
        }
        Ok(())
    }
}
