use anyhow::Context;
use log::*;
use seqread::config::{parse_args, SeqcatConfig};
use seqread::recurse::{concat_readers_async, ReadBox};
use seqread::{print_bytes, IoSource, SequenceReader, Source};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

enum Input {
    Stdin,
    File(File),
}

impl Input {
    fn blocking(self) -> Box<dyn Read> {
        match self {
            Input::Stdin => Box::new(std::io::stdin()),
            Input::File(f) => Box::new(f),
        }
    }
    fn tokio(self) -> ReadBox {
        match self {
            Input::Stdin => Box::pin(tokio::io::stdin()),
            Input::File(f) => Box::pin(tokio::fs::File::from_std(f)),
        }
    }
}

fn open_all(config: &SeqcatConfig) -> anyhow::Result<Vec<Input>> {
    if config.files.is_empty() {
        return Ok(vec![Input::Stdin]);
    }
    config
        .files
        .iter()
        .map(|path| {
            if path == Path::new("-") {
                Ok(Input::Stdin)
            } else {
                File::open(path)
                    .map(Input::File)
                    .with_context(|| format!("could not open {}", path.to_string_lossy()))
            }
        })
        .collect()
}

fn copy_blocking(config: &SeqcatConfig, inputs: Vec<Input>) -> anyhow::Result<u64> {
    let mut inp = SequenceReader::new(inputs.into_iter().map(|i| IoSource::new(i.blocking())))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut buf = vec![0u8; config.buffer_size.0];
    let len = buf.len() as isize;
    let mut total = 0u64;
    while let Some(n) = inp.read_window(Some(&mut buf[..]), 0, len)? {
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
    inp.close()?;
    out.flush()?;
    Ok(total)
}

fn copy_async(config: &SeqcatConfig, inputs: Vec<Input>) -> anyhow::Result<u64> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start tokio runtime")?;
    let buffer_size = config.buffer_size.0;
    rt.block_on(async move {
        // tokio file handles need a running runtime, so convert in here
        let readers = inputs.into_iter().map(Input::tokio).collect();
        let mut inp =
            tokio::io::BufReader::with_capacity(buffer_size, concat_readers_async(readers));
        let mut out = tokio::io::stdout();
        let total = tokio::io::copy_buf(&mut inp, &mut out).await?;
        tokio::io::AsyncWriteExt::flush(&mut out).await?;
        Ok::<_, anyhow::Error>(total)
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = parse_args(std::env::args_os())?;
    if config.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    let inputs = open_all(&config)?;
    debug!("reading {} inputs", inputs.len());
    let total = if config.use_async {
        copy_async(&config, inputs)?
    } else {
        copy_blocking(&config, inputs)?
    };
    debug!("wrote {}", print_bytes(total as f64));
    Ok(())
}
