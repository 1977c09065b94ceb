use std::io::Write;

use anyhow::Result;
use chrono::Datelike;

use crate::{
    actions::{seed, ManualMilestone},
    engine::MAX_BASELINE,
    store::LedgerStore,
    utils::clock::{today, Clock},
};

use super::output::reflection::render_reflection;

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = true)]
pub struct SeedCommand {
    #[arg(
        long,
        value_parser = clap::value_parser!(i64).range(0..=MAX_BASELINE),
        help = "Lifetime count accumulated before the ledger was started. 0 resets it"
    )]
    baseline: Option<i64>,
    #[arg(
        short,
        long = "milestone",
        help = "Milestone reached before the ledger was started, as <crore>=<DD-MM-YYYY>. Can be repeated, e.g. -m 1=04-02-2019 -m 2=15-03-2023"
    )]
    milestones: Vec<ManualMilestone>,
}

/// Seeds the baseline and historical milestones, then shows the refreshed reflection.
pub async fn process_seed_command(
    SeedCommand {
        baseline,
        milestones,
    }: SeedCommand,
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let reflection = seed(store, baseline, &milestones, today(clock).year()).await?;
    if let Some(baseline) = baseline {
        writeln!(out, "Baseline set to {baseline}")?;
    }
    if !milestones.is_empty() {
        writeln!(out, "Seeded {} milestone(s)", milestones.len())?;
    }
    render_reflection(&reflection, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};
    use clap::Parser;

    use crate::{
        cli::{Args, Commands},
        store::{memory_store::MemoryStore, read_baseline, LedgerStore},
        utils::clock::MockClock,
    };

    use super::process_seed_command;

    #[test]
    fn seed_requires_something_to_seed() {
        assert!(Args::try_parse_from(["jaapledger", "seed"]).is_err());
        assert!(Args::try_parse_from(["jaapledger", "seed", "--baseline", "-5"]).is_err());
        assert!(Args::try_parse_from([
            "jaapledger",
            "seed",
            "--baseline",
            "9223372036854775807"
        ])
        .is_err());
        assert!(Args::try_parse_from(["jaapledger", "seed", "-m", "2=2023-03-15"]).is_err());
    }

    #[tokio::test]
    async fn test_seed_from_arguments() -> Result<()> {
        let args = Args::try_parse_from([
            "jaapledger",
            "seed",
            "--baseline",
            "25000000",
            "-m",
            "1=04-02-2019",
            "--milestone",
            "2=15-03-2023",
        ])?;
        let Commands::Seed { command } = args.commands else {
            panic!("expected seed command");
        };

        let store = MemoryStore::new();
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Local.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).single().unwrap());

        let mut out = Vec::new();
        process_seed_command(command, &store, &clock, &mut out).await?;

        assert_eq!(read_baseline(&store).await?, 25_000_000);
        let milestones = store.list_milestones().await?;
        assert_eq!(milestones.len(), 2);
        assert_eq!(
            milestones[1].date,
            NaiveDate::from_ymd_opt(2023, 3, 15).unwrap()
        );

        let out = String::from_utf8(out)?;
        assert!(out.contains("Baseline set to 25000000"));
        assert!(out.contains("2 crore - 15-03-2023"));
        assert!(out.contains("Next milestone: 30000000 (50.00%)"));
        Ok(())
    }
}
