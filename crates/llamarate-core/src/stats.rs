use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct RateSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl RateSummary {
    /// `None` for an empty sequence, there is no meaningful mean or range.
    pub fn from_rates(rates: &[f64]) -> Option<Self> {
        if rates.is_empty() {
            return None;
        }

        let n = rates.len() as f64;
        let average = rates.iter().sum::<f64>() / n;
        let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            average,
            min,
            max,
        })
    }
}

/// Print the summary line followed by every sample, in run order.
pub fn write_report<W: Write>(out: &mut W, label: &str, rates: &[f64]) -> io::Result<()> {
    let Some(summary) = RateSummary::from_rates(rates) else {
        writeln!(out, "{} average: n/a min: n/a max: n/a (no samples recorded)", label)?;
        return Ok(());
    };

    writeln!(
        out,
        "{} average: {:.2} min: {:.2} max: {:.2}",
        label, summary.average, summary.min, summary.max
    )?;
    writeln!(out)?;

    for rate in rates {
        writeln!(out, "{:.2}", rate)?;
    }

    Ok(())
}
