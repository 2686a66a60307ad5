//! Command-line options

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const USAGE: &str = "usage: hq-driver <file.html> [--iterations N] [--threads N] [--json]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub iterations: usize,
    pub threads: usize,
    pub json: bool,
}

impl Options {
    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut input = None;
        let mut iterations = 1000;
        let mut threads = 1;
        let mut json = false;

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--iterations" | "-n" => iterations = count(&arg, args.next())?,
                "--threads" | "-t" => threads = count(&arg, args.next())?,
                "--json" => json = true,
                "--help" | "-h" => bail!(USAGE),
                flag if flag.starts_with('-') => bail!("unknown option {}\n{}", flag, USAGE),
                _ if input.is_none() => input = Some(PathBuf::from(arg)),
                _ => bail!("unexpected argument {}\n{}", arg, USAGE),
            }
        }

        let input = input.with_context(|| format!("missing input file\n{}", USAGE))?;
        if threads == 0 {
            bail!("--threads must be at least 1");
        }

        Ok(Self {
            input,
            iterations,
            threads,
            json,
        })
    }
}

fn count(flag: &str, value: Option<String>) -> Result<usize> {
    let value = value.with_context(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .with_context(|| format!("{} expects a number, got {:?}", flag, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::parse(["page.html"]).unwrap();
        assert_eq!(options.input, PathBuf::from("page.html"));
        assert_eq!(options.iterations, 1000);
        assert_eq!(options.threads, 1);
        assert!(!options.json);
    }

    #[test]
    fn test_flags() {
        let options = Options::parse(["--iterations", "5", "page.html", "-t", "3", "--json"]).unwrap();
        assert_eq!(options.iterations, 5);
        assert_eq!(options.threads, 3);
        assert!(options.json);
    }

    #[test]
    fn test_errors() {
        assert!(Options::parse(Vec::<String>::new()).is_err());
        assert!(Options::parse(["page.html", "--iterations"]).is_err());
        assert!(Options::parse(["page.html", "--iterations", "many"]).is_err());
        assert!(Options::parse(["page.html", "--threads", "0"]).is_err());
        assert!(Options::parse(["page.html", "--verbose"]).is_err());
        assert!(Options::parse(["a.html", "b.html"]).is_err());
    }
}
