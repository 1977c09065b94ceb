use std::io::{self, Write};

use ansi_term::{Colour, Style};
use chrono::NaiveDate;

use crate::{
    store::entities::LedgerEntry,
    utils::time::{date_to_record_name, is_editable},
};

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub entry: LedgerEntry,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub rows: Vec<LedgerRow>,
}

/// Groups entries by year, newest year first, newest date first inside a year.
pub fn group_by_year(mut entries: Vec<LedgerEntry>, today: NaiveDate) -> Vec<YearGroup> {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
        .chunk_by(|a, b| a.year() == b.year())
        .filter_map(|chunk| {
            let year = chunk.first()?.year();
            let rows = chunk
                .iter()
                .map(|entry| LedgerRow {
                    entry: entry.clone(),
                    editable: is_editable(entry.date, today),
                })
                .collect();
            Some(YearGroup { year, rows })
        })
        .collect()
}

/// Prints the ledger. The current year is always expanded, other years only with `show_all`.
pub fn render_ledger(
    groups: &[YearGroup],
    current_year: i32,
    show_all: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    if groups.is_empty() {
        writeln!(out, "The ledger is empty")?;
        return Ok(());
    }

    for group in groups {
        let expanded = show_all || group.year == current_year;
        if !expanded {
            writeln!(
                out,
                "{} ({} entries, use --all to expand)",
                Style::new().bold().paint(group.year.to_string()),
                group.rows.len()
            )?;
            continue;
        }

        writeln!(out, "{}", Style::new().bold().paint(group.year.to_string()))?;
        for row in &group.rows {
            render_row(row, out)?;
        }
    }
    Ok(())
}

fn render_row(row: &LedgerRow, out: &mut impl Write) -> io::Result<()> {
    let entry = &row.entry;
    let date = date_to_record_name(entry.date);
    if row.editable {
        writeln!(
            out,
            "  {date} - {} {}",
            entry.count,
            Colour::Cyan.paint("(editable)")
        )?;
        writeln!(out, "      Notes: {}", entry.notes())?;
        writeln!(
            out,
            "      Update with: jaapledger edit --date {date} --count <COUNT> [--notes <NOTES>]"
        )?;
    } else {
        writeln!(out, "  {date} - {}", entry.count)?;
        writeln!(out, "      Jaap Count: {}", entry.count)?;
        writeln!(out, "      Notes: {}", entry.notes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::store::entities::LedgerEntry;

    use super::{group_by_year, render_ledger};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entries() -> Vec<LedgerEntry> {
        vec![
            LedgerEntry::new(date(2023, 5, 1), 10, Some("old".into())),
            LedgerEntry::new(date(2024, 3, 12), 20, None),
            LedgerEntry::new(date(2024, 3, 20), 30, Some("today".into())),
            LedgerEntry::new(date(2024, 3, 13), 40, None),
            LedgerEntry::new(date(2023, 12, 31), 50, None),
        ]
    }

    #[test]
    fn groups_newest_first() {
        let groups = group_by_year(entries(), date(2024, 3, 20));

        assert_eq!(
            groups.iter().map(|v| v.year).collect::<Vec<_>>(),
            vec![2024, 2023]
        );
        assert_eq!(
            groups[0]
                .rows
                .iter()
                .map(|v| v.entry.date)
                .collect::<Vec<_>>(),
            vec![date(2024, 3, 20), date(2024, 3, 13), date(2024, 3, 12)]
        );
        assert_eq!(groups[1].rows[0].entry.date, date(2023, 12, 31));
    }

    #[test]
    fn only_last_week_is_editable() {
        let groups = group_by_year(entries(), date(2024, 3, 20));

        let editable = groups[0]
            .rows
            .iter()
            .map(|v| v.editable)
            .collect::<Vec<_>>();
        assert_eq!(editable, vec![true, true, false]);
        assert!(groups[1].rows.iter().all(|v| !v.editable));
    }

    #[test]
    fn other_years_are_collapsed() {
        let groups = group_by_year(entries(), date(2024, 3, 20));

        let mut out = Vec::new();
        render_ledger(&groups, 2024, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("2024-03-20 - 30"));
        assert!(out.contains("Notes: today"));
        assert!(out.contains("2 entries, use --all to expand"));
        assert!(!out.contains("2023-05-01"));

        let mut out = Vec::new();
        render_ledger(&groups, 2024, true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("2023-05-01 - 10"));
        assert!(out.contains("Jaap Count: 10"));
        assert!(out.contains("Notes: old"));
    }

    #[test]
    fn empty_ledger_has_a_message() {
        let mut out = Vec::new();
        render_ledger(&[], 2024, false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "The ledger is empty\n");
    }
}
