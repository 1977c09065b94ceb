use std::{fmt::Display, io::Write};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    actions::upsert_entry,
    engine::MAX_ENTRY_COUNT,
    store::LedgerStore,
    utils::{
        clock::{today, Clock},
        time::{date_to_record_name, is_editable, EDIT_WINDOW_DAYS},
    },
};

use super::{output::reflection::render_reflection, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct TodayCommand {
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-MAX_ENTRY_COUNT..=MAX_ENTRY_COUNT),
        help = "Count to record for today. Without it today's entry is printed"
    )]
    count: Option<i64>,
    #[arg(short, long, requires = "count", help = "Notes for today")]
    notes: Option<String>,
}

#[derive(Debug, Parser)]
pub struct EditCommand {
    #[arg(
        long,
        short,
        help = "Day to update. Examples are \"yesterday\", \"3 days ago\", \"15/03/2025\", \"2025-03-15\""
    )]
    date: String,
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(-MAX_ENTRY_COUNT..=MAX_ENTRY_COUNT),
        help = "New count for the day"
    )]
    count: i64,
    #[arg(
        short,
        long,
        help = "New notes for the day. Existing notes are kept when omitted"
    )]
    notes: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Saves today's entry, or prints it when no count is given.
pub async fn process_today_command(
    TodayCommand { count, notes }: TodayCommand,
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let today = today(clock);

    let Some(count) = count else {
        match store.get_entry(today).await? {
            Some(entry) => {
                writeln!(out, "{} - {}", date_to_record_name(entry.date), entry.count)?;
                writeln!(out, "Notes: {}", entry.notes())?;
            }
            None => writeln!(out, "Nothing recorded for {} yet", date_to_record_name(today))?,
        }
        return Ok(());
    };

    let reflection = upsert_entry(store, today, count, notes, today.year()).await?;
    writeln!(out, "Saved {} - {count}", date_to_record_name(today))?;
    render_reflection(&reflection, out)?;
    Ok(())
}

/// Updates an entry from the edit window. Dates outside of it are returned as clap validation
/// errors and nothing is written.
pub async fn process_edit_command(
    EditCommand {
        date,
        count,
        notes,
        date_style,
    }: EditCommand,
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let date = resolve_edit_date(&date, date_style, clock)?;

    let notes = match notes {
        Some(notes) => Some(notes),
        None => store.get_entry(date).await?.and_then(|v| v.notes),
    };

    let reflection = upsert_entry(store, date, count, notes, today(clock).year()).await?;
    writeln!(out, "Updated {} - {count}", date_to_record_name(date))?;
    render_reflection(&reflection, out)?;
    Ok(())
}

/// Accepts `YYYY-MM-DD` or anything chrono-english understands, and checks the edit window.
pub fn resolve_edit_date(
    value: &str,
    date_style: DateStyle,
    clock: &dyn Clock,
) -> Result<NaiveDate, clap::Error> {
    let now = clock.now();
    let date = match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(v) => v,
        Err(_) => parse_date_string(value, now, date_style.into())
            .map(|v| v.date_naive())
            .map_err(|e| {
                Args::command().error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date \"{value}\": {e}"),
                )
            })?,
    };

    if !is_editable(date, now.date_naive()) {
        return Err(Args::command().error(
            clap::error::ErrorKind::ValueValidation,
            format!(
                "{} is outside of the {EDIT_WINDOW_DAYS} day edit window",
                date_to_record_name(date)
            ),
        ));
    }
    Ok(date)
}
