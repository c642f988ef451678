use crate::error::{Result, StreamError};
use crate::source::{check_window, IoSource, Source};
use log::*;
use std::collections::VecDeque;
use std::io::Read;

/**
 * The logical concatenation of a list of sources.
 *
 * Reads drain the active source until it reports end of stream (or a read of 0 bytes),
 * then close it and continue with the next one. Every source is closed exactly once,
 * in order, either when it runs dry or when the whole reader is closed.
 *
 * Implements both [`Source`] and [`Read`], so with both traits imported `r.read(..)` is
 * ambiguous. Use [`SequenceReader::read_window`] or `Source::read(&mut r, ..)` then.
 */
pub struct SequenceReader<S: Source> {
    pending: VecDeque<S>,
    /// None once every source is used up. Never becomes Some again.
    cur: Option<S>,
}

impl<S: Source> SequenceReader<S> {
    pub fn new<I: IntoIterator<Item = S>>(sources: I) -> Result<SequenceReader<S>> {
        let mut r = SequenceReader {
            pending: sources.into_iter().collect(),
            cur: None,
        };
        debug!("concatenating {} sources", r.pending.len());
        r.advance()?;
        Ok(r)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cur.is_none()
    }

    /// same as [`Source::read`], callable without naming the trait
    pub fn read_window(
        &mut self,
        buf: Option<&mut [u8]>,
        offset: isize,
        len: isize,
    ) -> Result<Option<usize>> {
        Source::read(self, buf, offset, len)
    }

    /// number of sources not yet closed, including the active one
    pub fn remaining(&self) -> usize {
        self.pending.len() + usize::from(self.cur.is_some())
    }

    /// retire the active source and activate the next one.
    ///
    /// the active source counts as closed even if closing it fails
    fn advance(&mut self) -> Result<()> {
        let retired = self.cur.take();
        self.cur = self.pending.pop_front();
        trace!("advancing, {} sources left", self.remaining());
        match retired {
            Some(mut src) => src.close(),
            None => Ok(()),
        }
    }
}

impl<S: Source> Source for SequenceReader<S> {
    fn read(&mut self, buf: Option<&mut [u8]>, offset: isize, len: isize) -> Result<Option<usize>> {
        if self.cur.is_none() {
            return Ok(None);
        }
        let buf = buf.ok_or(StreamError::InvalidArgument)?;
        check_window(buf.len(), offset, len)?;
        if len == 0 {
            return Ok(Some(0));
        }
        while let Some(cur) = self.cur.as_mut() {
            match cur.read(Some(&mut *buf), offset, len)? {
                Some(n) if n > 0 => return Ok(Some(n)),
                _ => self.advance()?,
            }
        }
        Ok(None)
    }

    /// close the active source and all pending ones.
    ///
    /// keeps going if a source fails to close and returns the first failure afterwards
    fn close(&mut self) -> Result<()> {
        let mut first_err = None;
        while self.cur.is_some() {
            if let Err(e) = self.advance() {
                warn!("failed to close source: {}", e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: Source> Read for SequenceReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = buf.len() as isize;
        match Source::read(self, Some(buf), 0, len)? {
            Some(n) => Ok(n),
            None => Ok(0),
        }
    }
}

impl<S: Source> Drop for SequenceReader<S> {
    fn drop(&mut self) {
        if self.cur.is_some() {
            debug!("dropping reader with {} open sources", self.remaining());
            if let Err(e) = Source::close(self) {
                warn!("could not close all sources on drop: {}", e);
            }
        }
    }
}

/// concatenate plain readers. Each reader is dropped as soon as it is used up.
pub fn concat_readers<I>(readers: I) -> Result<SequenceReader<IoSource<I::Item>>>
where
    I: IntoIterator,
    I::Item: Read,
{
    SequenceReader::new(readers.into_iter().map(IoSource::new))
}
