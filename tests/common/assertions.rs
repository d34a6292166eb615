//! Assertion macros for hiveq harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that show the
//! whole rendered output.

/// Assert that rendered output has exactly these hit lines before the
/// summary, in order.
///
/// ```rust
/// assert_hit_lines!(output, ["Key: Beta", "Key: Beta\\Gamma"]);
/// ```
#[macro_export]
macro_rules! assert_hit_lines {
    ($output:expr, [$($line:expr),* $(,)?]) => {{
        let output: &str = &$output;
        let hits: Vec<&str> = output
            .lines()
            .take_while(|l| !l.is_empty())
            .collect();
        let expected: Vec<&str> = vec![$($line),*];
        pretty_assertions::assert_eq!(hits, expected, "full output:\n{}", output);
    }};
}

/// Assert that rendered output carries no ANSI escape sequences.
#[macro_export]
macro_rules! assert_no_ansi {
    ($output:expr) => {{
        let output: &str = &$output;
        assert!(
            !output.contains('\u{1b}'),
            "assert_no_ansi! failed: output contains escape sequences:\n{:?}",
            output
        );
    }};
}

/// Assert that the last line of output is a summary starting with `$prefix`.
#[macro_export]
macro_rules! assert_summary {
    ($output:expr, $prefix:expr) => {{
        let output: &str = &$output;
        let last = output.lines().last().unwrap_or_default();
        assert!(
            last.starts_with($prefix) && last.ends_with("s)"),
            "assert_summary! failed:\n  expected prefix: {:?}\n  last line: {:?}\n  full output:\n{}",
            $prefix,
            last,
            output
        );
    }};
}
