//! Command-line surface.
//!
//! Flags are documented in mixed case (`--KeyName`, `--RegEx`) and accepted in
//! any case: [`normalize_args`] lower-cases known long flag names before clap
//! sees them. `-?` is an alias for `--help`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use hiveq_core::QueryArgs;

/// Long flags that take a value.
const VALUE_FLAGS: &[&str] = &[
    "hive",
    "keyname",
    "valuename",
    "savetoname",
    "startdate",
    "enddate",
    "minsize",
    "sk",
    "sv",
    "sd",
    "ss",
];

/// Long flags that are plain switches.
const SWITCH_FLAGS: &[&str] = &[
    "literal",
    "recover",
    "recursive",
    "regex",
    "sort",
    "suppressdata",
    "debug",
    "help",
    "version",
];

#[derive(Debug, Parser)]
#[command(
    name = "hiveq",
    version,
    about = "Search and dump keys and values in Windows registry hives",
    after_help = "Flag names are case-insensitive (--KeyName and --keyname are the same flag)."
)]
pub struct Cli {
    /// Hive file to open (binary regf hive or JSON snapshot).
    #[arg(long, value_name = "PATH")]
    pub hive: PathBuf,

    /// Match data/slack terms exactly; skip the byte-encoding fallback.
    #[arg(long)]
    pub literal: bool,

    /// Include deleted keys and values.
    #[arg(long)]
    pub recover: bool,

    /// With --KeyName, dump the key and everything below it.
    #[arg(long)]
    pub recursive: bool,

    /// Treat search terms as regular expressions.
    #[arg(long = "regex")]
    pub regex: bool,

    /// Sort hits by the searched field.
    #[arg(long)]
    pub sort: bool,

    /// Leave value data and slack out of data/slack search output.
    #[arg(long = "suppressdata")]
    pub suppress_data: bool,

    /// Show a single key.
    #[arg(long = "keyname", value_name = "PATH")]
    pub key_name: Option<String>,

    /// With --KeyName, show a single value of that key.
    #[arg(long = "valuename", value_name = "NAME")]
    pub value_name: Option<String>,

    /// With --KeyName and --ValueName, write the raw value bytes to PATH.
    #[arg(long = "savetoname", value_name = "PATH")]
    pub save_to_name: Option<PathBuf>,

    /// Keys last written at or after this time (UTC unless an offset is given).
    #[arg(long = "startdate", value_name = "DATETIME")]
    pub start_date: Option<String>,

    /// Keys last written at or before this time (UTC unless an offset is given).
    #[arg(long = "enddate", value_name = "DATETIME")]
    pub end_date: Option<String>,

    /// Values whose data is at least this many bytes.
    #[arg(long = "minsize", value_name = "BYTES", default_value_t = 0)]
    pub min_size: u64,

    /// Search key names.
    #[arg(long = "sk", value_name = "TERM")]
    pub search_keys: Option<String>,

    /// Search value names.
    #[arg(long = "sv", value_name = "TERM")]
    pub search_values: Option<String>,

    /// Search value data.
    #[arg(long = "sd", value_name = "TERM")]
    pub search_data: Option<String>,

    /// Search value slack.
    #[arg(long = "ss", value_name = "TERM")]
    pub search_slack: Option<String>,

    /// Log debug events to stderr.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse the process arguments, accepting flags in any case.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Query-relevant arguments for mode selection.
    pub fn query_args(&self) -> QueryArgs {
        QueryArgs {
            key_name: self.key_name.clone(),
            value_name: self.value_name.clone(),
            min_size: self.min_size,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            search_keys: self.search_keys.clone(),
            search_values: self.search_values.clone(),
            search_data: self.search_data.clone(),
            search_slack: self.search_slack.clone(),
            regex: self.regex,
            literal: self.literal,
            recursive: self.recursive,
        }
    }
}

/// Lower-case known long flag names and map `-?` to `--help`.
///
/// Values are passed through untouched, including values that look like
/// flags, and everything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        if text == "--" {
            passthrough = true;
            out.push(arg);
        } else if text == "-?" {
            out.push("--help".into());
        } else if let Some(flag) = text.strip_prefix("--") {
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            let lower = name.to_ascii_lowercase();
            let is_value_flag = VALUE_FLAGS.contains(&lower.as_str());
            if !is_value_flag && !SWITCH_FLAGS.contains(&lower.as_str()) {
                out.push(arg);
                continue;
            }
            expect_value = is_value_flag && inline_value.is_none();
            out.push(match inline_value {
                Some(value) => format!("--{lower}={value}").into(),
                None => format!("--{lower}").into(),
            });
        } else {
            out.push(arg);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
