use std::io::{self, Write};

use ansi_term::{Colour, Style};

use crate::{
    engine::{totals::Totals, Reflection},
    store::entities::MilestoneRecord,
    utils::{percentage::Percentage, time::format_display_date},
};

const PROGRESS_BAR_WIDTH: usize = 40;

/// `20000000 (12.50%)`
pub fn next_milestone_text(totals: &Totals) -> String {
    format!("{} ({})", totals.next_milestone, totals.progress)
}

/// `Progress: 12.50% towards 20000000`
pub fn progress_text(totals: &Totals) -> String {
    format!(
        "Progress: {} towards {}",
        totals.progress, totals.next_milestone
    )
}

/// `2 crore - 15-03-2023`
pub fn milestone_text(record: &MilestoneRecord) -> String {
    format!(
        "{} crore - {}",
        record.crore(),
        format_display_date(record.date)
    )
}

pub fn progress_bar(progress: Percentage, width: usize) -> String {
    let filled = ((*progress / 100.) * width as f64).floor() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn render_reflection(reflection: &Reflection, out: &mut impl Write) -> io::Result<()> {
    let totals = &reflection.totals;
    writeln!(out, "{}", Style::new().bold().paint("Reflection"))?;
    writeln!(out, "Year total:     {}", totals.year_total)?;
    writeln!(out, "Lifetime total: {}", totals.lifetime_total)?;
    writeln!(out, "Next milestone: {}", next_milestone_text(totals))?;
    writeln!(
        out,
        "{} {}",
        Colour::Green.paint(progress_bar(totals.progress, PROGRESS_BAR_WIDTH)),
        progress_text(totals)
    )?;

    writeln!(out)?;
    writeln!(out, "{}", Style::new().bold().paint("Milestones"))?;
    if reflection.milestones.is_empty() {
        writeln!(out, "None yet")?;
    }
    for record in &reflection.milestones {
        writeln!(out, "{}", milestone_text(record))?;
    }

    for record in &reflection.newly_crossed {
        writeln!(
            out,
            "{}",
            Colour::Yellow
                .bold()
                .paint(format!("New milestone reached: {}", milestone_text(record)))
        )?;
    }
    Ok(())
}
