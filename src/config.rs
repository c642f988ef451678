use anyhow::{Context, Result};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::{path::PathBuf, str::FromStr};
use structopt::{clap, StructOpt};

fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub struct BufferSize(pub usize);

impl std::fmt::Display for BufferSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl Default for BufferSize {
    fn default() -> Self {
        BufferSize(1 << 16)
    }
}

impl FromStr for BufferSize {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, factor) = match s.chars().last() {
            Some('k') => (&s[..s.len() - 1], 1 << 10),
            Some('M') => (&s[..s.len() - 1], 1 << 20),
            Some(_) => (s, 1),
            None => return Err(anyhow::format_err!("empty byte input")),
        };
        let n = usize::from_str(digits).with_context(|| format!("could not parse int: {s}"))?;
        n.checked_mul(factor)
            .map(BufferSize)
            .ok_or_else(|| anyhow::format_err!("byte size too large: {s}"))
    }
}

/// # seqcat configuration
///
/// Declares the command line arguments (structopt) and the JSON format accepted
/// in the `SEQCAT_CONFIG` environment variable (serde) in one place.
#[derive(StructOpt, Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[structopt(
    name = "seqcat",
    rename_all = "kebab-case",
    about = env!("CARGO_PKG_DESCRIPTION"),
    after_help = "Defaults can also be given as JSON in the SEQCAT_CONFIG environment variable. Command line arguments take precedence."
)]
pub struct SeqcatConfig {
    /// Size of the buffer used for each read.
    ///
    /// Allowed suffixes: k M
    #[serde(default, skip_serializing_if = "is_default")]
    #[structopt(default_value, long, require_equals = true)]
    pub buffer_size: BufferSize,

    /// Concatenate using the tokio based reader instead of the blocking one.
    #[serde(default, skip_serializing_if = "is_default")]
    #[structopt(long = "async")]
    pub use_async: bool,

    /// Files to concatenate. "-" reads stdin. Without any files, stdin is read.
    #[serde(skip)] // CLI only
    #[structopt(parse(from_os_str))]
    pub files: Vec<PathBuf>,

    #[serde(skip)] // CLI only
    #[structopt(long, help = "Print the merged configuration as JSON and exit")]
    pub print_config: bool,
}

pub static SEQCAT_CONFIG: &str = "SEQCAT_CONFIG";

fn json_merge(a: &mut Value, b: &Value) {
    match (a, b) {
        (&mut Value::Object(ref mut a), Value::Object(b)) => {
            for (k, v) in b {
                json_merge(a.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
        (a, b) => {
            *a = b.clone();
        }
    }
}

fn read_config_env(val: Option<String>) -> Result<Value> {
    if let Some(val) = val {
        serde_json::from_str(&val)
            .with_context(|| format!("could not parse config from env {SEQCAT_CONFIG}"))
    } else {
        serde_json::to_value(SeqcatConfig::default()).context("could not create default config")
    }
}

/// merge the config given in the environment value `env` with the command line `args`. args win.
pub fn merge_config<I>(args: I, env: Option<String>) -> Result<SeqcatConfig>
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    let arg_matches = match SeqcatConfig::from_iter_safe(args) {
        Ok(m) => m,
        Err(e)
            if e.kind == clap::ErrorKind::HelpDisplayed
                || e.kind == clap::ErrorKind::VersionDisplayed =>
        {
            e.exit()
        }
        Err(e) => return Err(e.into()),
    };
    let args_config = serde_json::to_value(&arg_matches)?;

    let mut merged_config = read_config_env(env)?;
    json_merge(&mut merged_config, &args_config);
    debug!("Config: {}", serde_json::to_string(&merged_config)?);

    let mut res: SeqcatConfig =
        serde_json::from_value(merged_config.clone()).with_context(|| {
            format!(
                "error parsing merged config: {}",
                serde_json::to_string_pretty(&merged_config).unwrap_or_default()
            )
        })?;
    if res.buffer_size.0 == 0 {
        return Err(anyhow::format_err!("buffer size must not be 0"));
    }
    {
        // readd values with [serde(skip)]
        res.files = arg_matches.files;
        res.print_config = arg_matches.print_config;
    }
    Ok(res)
}

pub fn parse_args<I>(args: I) -> Result<SeqcatConfig>
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    merge_config(args, std::env::var(SEQCAT_CONFIG).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_sizes() -> Result<()> {
        for (a, b) in &[("1", 1), ("4096", 4096), ("8k", 8192), ("2M", 2 << 20)] {
            assert_eq!(BufferSize::from_str(a)?, BufferSize(*b));
        }
        assert!(BufferSize::from_str("").is_err());
        assert!(BufferSize::from_str("k").is_err());
        assert!(BufferSize::from_str("12G").is_err());
        let e = BufferSize::from_str("x").unwrap_err();
        assert_eq!(e.to_string(), "could not parse int: x");
        Ok(())
    }

    #[test]
    fn defaults() -> Result<()> {
        let c = merge_config(vec!["seqcat"], None)?;
        assert_eq!(c, SeqcatConfig::default());
        assert_eq!(c.buffer_size, BufferSize(65536));
        Ok(())
    }

    #[test]
    fn args_override_env() -> Result<()> {
        let env = Some(r#"{"buffer_size": 16, "use_async": true}"#.to_string());
        let c = merge_config(vec!["seqcat", "--buffer-size=1k", "a", "-"], env.clone())?;
        assert_eq!(c.buffer_size, BufferSize(1024));
        assert!(c.use_async);
        assert_eq!(c.files, vec![PathBuf::from("a"), PathBuf::from("-")]);

        let c = merge_config(vec!["seqcat"], env)?;
        assert_eq!(c.buffer_size, BufferSize(16));
        Ok(())
    }

    #[test]
    fn rejects_bad_config() {
        assert!(merge_config(vec!["seqcat"], Some("{".to_string())).is_err());
        assert!(merge_config(vec!["seqcat", "--buffer-size=0"], None).is_err());
        assert!(merge_config(vec!["seqcat", "--buffer-size=x"], None).is_err());
    }
}
