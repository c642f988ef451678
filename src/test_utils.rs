use crate::error::{Result, StreamError};
use crate::source::{check_window, Source};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Read(&'static str),
    Close(&'static str),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// What a scripted source does on its next read call.
pub enum Step {
    Data(&'static [u8]),
    /// a read returning 0 without being at the end
    Empty,
    Fail(io::ErrorKind),
}

/**
 * a source that replays a fixed script of reads and records every read and close into a shared log.
 *
 * once the script is used up, reads report end of stream.
 */
pub struct ScriptedSource {
    name: &'static str,
    steps: VecDeque<Step>,
    fail_close: bool,
    log: EventLog,
}

impl ScriptedSource {
    pub fn new(name: &'static str, steps: Vec<Step>, log: &EventLog) -> ScriptedSource {
        ScriptedSource {
            name,
            steps: steps.into(),
            fail_close: false,
            log: log.clone(),
        }
    }
    /// a source yielding each chunk in its own read
    pub fn chunks(name: &'static str, chunks: &[&'static str], log: &EventLog) -> ScriptedSource {
        Self::new(name, chunks.iter().map(|c| Step::Data(c.as_bytes())).collect(), log)
    }
    pub fn failing_close(mut self) -> ScriptedSource {
        self.fail_close = true;
        self
    }
}

impl Source for ScriptedSource {
    fn read(&mut self, buf: Option<&mut [u8]>, offset: isize, len: isize) -> Result<Option<usize>> {
        self.log.borrow_mut().push(Event::Read(self.name));
        let buf = buf.ok_or(StreamError::InvalidArgument)?;
        let window = check_window(buf.len(), offset, len)?;
        match self.steps.pop_front() {
            None => Ok(None),
            Some(Step::Empty) => Ok(Some(0)),
            Some(Step::Fail(kind)) => Err(io::Error::new(kind, self.name).into()),
            Some(Step::Data(data)) => {
                let n = data.len().min(window.len());
                buf[window.start..window.start + n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(Step::Data(&data[n..]));
                }
                Ok(Some(n))
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().push(Event::Close(self.name));
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, format!("closing {}", self.name)).into());
        }
        Ok(())
    }
}

pub fn closes(log: &EventLog) -> Vec<&'static str> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Close(name) => Some(*name),
            Event::Read(_) => None,
        })
        .collect()
}

/// read a source to its end using reads of at most `chunk` bytes
pub fn drain(src: &mut impl Source, chunk: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; chunk];
    let mut out = Vec::new();
    while let Some(n) = src.read(Some(&mut buf[..]), 0, chunk as isize)? {
        out.extend_from_slice(&buf[..n]);
    }
    Ok(out)
}
