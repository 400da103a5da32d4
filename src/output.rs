//! Terminal rendering of search hits, validation reports and freshness

use crate::index::build::CheckOutcome;
use crate::index::types::{EnvChange, Freshness};
use crate::index::validate::{Severity, ValidationReport};
use crate::query::{HitKind, SearchHit};
use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Hint printed whenever an index has to be regenerated
pub const REBUILD_HINT: &str = "rebuild the index with `sphindex build <source>`";

/// Stdout stream; `Auto` turns color off when stdout is not a terminal
pub fn stdout(choice: ColorChoice) -> StandardStream {
    let choice = match choice {
        ColorChoice::Auto if !io::stdout().is_terminal() => ColorChoice::Never,
        other => other,
    };
    StandardStream::stdout(choice)
}

/// Print ranked hits as `docname[#anchor]  title  (score)`
pub fn print_hits<W: WriteColor>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(());
    }

    for hit in hits {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{}", hit.docname)?;
        if let Some(anchor) = &hit.anchor {
            write!(out, "#{}", anchor)?;
        }
        out.reset()?;

        write!(out, "  {}", hit.title)?;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        let kind = match hit.kind {
            HitKind::Title => "title",
            HitKind::Text => "text",
        };
        writeln!(out, "  ({} {})", kind, hit.score)?;
        out.reset()?;
    }

    Ok(())
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Cyan,
    }
}

/// Print every issue, most severe first, then a one-line summary
pub fn print_report<W: WriteColor>(out: &mut W, report: &ValidationReport) -> io::Result<()> {
    let mut issues: Vec<_> = report.issues.iter().collect();
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    for issue in issues {
        out.set_color(ColorSpec::new().set_fg(Some(severity_color(issue.severity))).set_bold(true))?;
        write!(out, "{}", issue.severity)?;
        out.reset()?;
        writeln!(out, ": {}", issue.message)?;
    }

    writeln!(
        out,
        "{} errors, {} warnings, {} notes",
        report.error_count(),
        report.warning_count(),
        report.info_count()
    )?;
    if report.is_corrupt() {
        writeln!(out, "index is corrupt: {}", REBUILD_HINT)?;
    }
    Ok(())
}

/// Print the result of a freshness comparison
pub fn print_freshness<W: WriteColor>(out: &mut W, freshness: &Freshness) -> io::Result<()> {
    match freshness {
        Freshness::Current => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            writeln!(out, "generator versions are current")?;
            out.reset()?;
        }
        Freshness::RebuildRequired(changes) => {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
            writeln!(out, "rebuild required: generator versions changed")?;
            out.reset()?;
            for change in changes {
                writeln!(out, "  {}", describe_change(change))?;
            }
            writeln!(out, "{}", REBUILD_HINT)?;
        }
    }
    Ok(())
}

fn describe_change(change: &EnvChange) -> String {
    let marker = match change {
        EnvChange::Missing { .. } => '+',
        EnvChange::Unexpected { .. } => '-',
        EnvChange::Changed { .. } => '~',
    };
    format!("{} {}", marker, change)
}

/// Print the outcome of `build --check`
pub fn print_check_outcome<W: WriteColor>(out: &mut W, outcome: CheckOutcome) -> io::Result<()> {
    let (color, text) = match outcome {
        CheckOutcome::ByteIdentical => (Color::Green, "index is up to date (byte-identical)"),
        CheckOutcome::SemanticallyIdentical => {
            (Color::Green, "index is up to date (same content, different encoding)")
        }
        CheckOutcome::Differs => (Color::Red, "index is out of date"),
        CheckOutcome::Missing => (Color::Red, "index does not exist"),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    writeln!(out, "{}", text)?;
    out.reset()
}
