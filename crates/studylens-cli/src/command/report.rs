//! Plain-text rendering of the paired-run comparisons.

use std::io::{self, Write};

use anyhow::Context;
use studylens_analysis::comparison::{Comparisons, StatisticCounts};

const RATINGS_HEADING: &str = "Number of participants who had a lower value for the statistic\n\
                               during their task with ratings than their task without ratings:";
const ORDER_HEADING: &str = "Number of participants who had a higher value for the statistic\n\
                             during their second task than their first task:";

pub(crate) fn print_comparisons(comparisons: &Comparisons) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_comparisons(&mut stdout, comparisons)
        .and_then(|()| stdout.flush())
        .context("Failed to write comparisons to stdout")
}

fn write_comparisons<W>(writer: &mut W, comparisons: &Comparisons) -> io::Result<()>
where
    W: Write,
{
    write_section(writer, RATINGS_HEADING, &comparisons.ratings)?;
    writeln!(writer)?;
    write_section(writer, ORDER_HEADING, &comparisons.order)
}

fn write_section<W>(writer: &mut W, heading: &str, counts: &StatisticCounts) -> io::Result<()>
where
    W: Write,
{
    writeln!(writer, "{heading}")?;
    writeln!(writer)?;
    for (stat, count) in counts.iter() {
        writeln!(writer, "{stat} {count}")?;
    }
    Ok(())
}
