//! The run: one hive, one query mode, one rendered answer.
//!
//! ```text
//! hive path ──► load ──► select mode ──► predicate ──► store ──► sort
//!                                                                 │
//!                         export ◄── render ◄── highlight ◄───────┘
//! ```
//!
//! [`run`] is the error boundary. Every failure below it is a [`QueryError`],
//! classified by [`QueryError::severity`] and logged; nothing escapes as a
//! panic or a non-zero exit.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use hiveq_core::export::export_value;
use hiveq_core::predicate;
use hiveq_core::results::{sort_hits, Summary};
use hiveq_core::store::HiveStore;
use hiveq_core::{QueryError, SearchCriteria, Severity};
use hiveq_term::{Highlighter, OutputStyle, Renderer};
use tracing::{debug, error, warn};

use crate::cli::Cli;

/// Output switches that don't affect which hits are found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub sort: bool,
    pub suppress_data: bool,
    pub save_to: Option<PathBuf>,
}

impl RunOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            sort: cli.sort,
            suppress_data: cli.suppress_data,
            save_to: cli.save_to_name.clone(),
        }
    }
}

/// Run one invocation, writing results to `out` and logging any failure.
pub fn run<W: Write>(cli: &Cli, style: &OutputStyle, out: &mut W) {
    if let Err(err) = try_run(cli, style, out) {
        report(&err);
    }
    if let Err(err) = out.flush() {
        error!(error = %err, "failed to flush output");
    }
}

fn try_run<W: Write>(cli: &Cli, style: &OutputStyle, out: &mut W) -> Result<(), QueryError> {
    if !cli.hive.is_file() {
        return Err(QueryError::HiveNotFound(cli.hive.clone()));
    }
    let hive = hiveq_hive::open(&cli.hive, cli.recover)
        .map_err(|err| QueryError::Other(anyhow::Error::new(err)))?;

    let Some(criteria) = SearchCriteria::select(&cli.query_args())? else {
        warn!("nothing to do: give --KeyName, --MinSize, --StartDate/--EndDate or one of --sk/--sv/--sd/--ss");
        return Ok(());
    };
    execute(&hive, &criteria, &RunOptions::from_cli(cli), style, out)
}

/// Query `store` for `criteria` and render the answer to `out`.
pub fn execute<W: Write>(
    store: &dyn HiveStore,
    criteria: &SearchCriteria,
    options: &RunOptions,
    style: &OutputStyle,
    out: &mut W,
) -> Result<(), QueryError> {
    let started = Instant::now();
    let root_name = store.root().name.as_str();

    match criteria {
        SearchCriteria::SingleKey {
            key_path,
            recursive,
        } => {
            let key = store
                .get_key(key_path)
                .ok_or_else(|| QueryError::KeyNotFound(key_path.clone()))?;
            let highlighter = Highlighter::none();
            Renderer::new(&highlighter, style, root_name)
                .write_key(out, key, *recursive)
                .map_err(QueryError::Output)?;
            debug!(elapsed = ?started.elapsed(), "run: key lookup finished");
        }
        SearchCriteria::SingleValue {
            key_path,
            value_name,
        } => {
            let key = store
                .get_key(key_path)
                .ok_or_else(|| QueryError::KeyNotFound(key_path.clone()))?;
            let value = key
                .value(value_name)
                .ok_or_else(|| QueryError::ValueNotFound {
                    key: key_path.clone(),
                    value: value_name.clone(),
                })?;
            let highlighter = Highlighter::none();
            Renderer::new(&highlighter, style, root_name)
                .write_value(out, key, value)
                .map_err(QueryError::Output)?;
            debug!(elapsed = ?started.elapsed(), "run: value lookup finished");

            if let Some(path) = &options.save_to {
                export_value(value, path).map_err(|source| QueryError::Export {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        _ => search(store, criteria, options, style, out, started)?,
    }
    Ok(())
}

fn search<W: Write>(
    store: &dyn HiveStore,
    criteria: &SearchCriteria,
    options: &RunOptions,
    style: &OutputStyle,
    out: &mut W,
    started: Instant,
) -> Result<(), QueryError> {
    let Some(predicate) = predicate::build(criteria) else {
        return Ok(());
    };
    let mut hits = hiveq_core::store::execute(store, &predicate)?;
    if options.sort {
        sort_hits(&mut hits, criteria);
    }

    let highlighter = Highlighter::for_criteria(criteria, style)?;
    let renderer = Renderer::new(&highlighter, style, store.root().name.as_str())
        .suppress_data(options.suppress_data);
    renderer
        .write_hits(out, &hits, criteria)
        .map_err(QueryError::Output)?;

    let elapsed = started.elapsed();
    if let Some(summary) = Summary::new(criteria, hits.len()) {
        renderer
            .write_summary(out, &summary, elapsed)
            .map_err(QueryError::Output)?;
    }
    Ok(())
}

fn report(err: &QueryError) {
    match (err.severity(), err) {
        (Severity::FatalInput, _) => error!("{err}"),
        (Severity::NotFound, _) => warn!("{err}"),
        (Severity::Unexpected, QueryError::Other(inner)) => error!("{inner:#}"),
        (Severity::Unexpected, _) => error!("{err}"),
    }
}
