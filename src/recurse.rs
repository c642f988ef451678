use std::pin::Pin;

use async_stream::try_stream;
use bytes::Bytes;
use log::*;
use tokio::io::AsyncRead;
use tokio_stream::{Stream, StreamExt};
use tokio_util::io::{ReaderStream, StreamReader};

pub type ReadBox = Pin<Box<dyn AsyncRead + Send>>;

fn chunks<I>(mut input: I) -> impl Stream<Item = std::io::Result<Bytes>> + Send
where
    I: Stream<Item = std::io::Result<ReadBox>> + Send + Unpin + 'static,
{
    try_stream! {
        let mut index = 0usize;
        while let Some(inp) = input.next().await {
            trace!("starting inner reader {}", index);
            let mut stream = ReaderStream::new(inp?);
            while let Some(bytes) = stream.next().await {
                yield bytes?;
            }
            // stream (and the reader inside it) is dropped here, before the next one is pulled
            debug!("inner reader {} done", index);
            index += 1;
        }
    }
}

/**
 * concatenate a stream of async readers into one reader.
 *
 * each reader is read to EOF and dropped before the next one is taken from `input`.
 * an error from `input` ends the output with that error.
 */
pub fn concat_read_streams<I>(input: I) -> ReadBox
where
    I: Stream<Item = std::io::Result<ReadBox>> + Send + Unpin + 'static,
{
    Box::pin(StreamReader::new(Box::pin(chunks(input))))
}

/// like [`concat_read_streams`], for a fixed list of readers
pub fn concat_readers_async(inputs: Vec<ReadBox>) -> ReadBox {
    concat_read_streams(tokio_stream::iter(inputs.into_iter().map(Ok)))
}
