use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod aggregate;
mod dataset;
mod generate;
mod kpi;
mod models;
mod report;

use models::Granularity;

#[derive(Parser)]
#[command(name = "usage-kpi")]
#[command(about = "Usage KPI pipeline for the CoursNotif app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a daily usage dataset and write it as CSV
    Generate {
        /// First day of the simulated period, day-first (DD/MM/YYYY)
        #[arg(long, default_value = "01/06/2025")]
        start_date: String,
        /// Length of the simulated period in days
        #[arg(long, default_value_t = 1000)]
        days: u32,
        /// Target potential-user population
        #[arg(long, default_value_t = 3410)]
        target_users: i64,
        /// Fraction of the population active once usage stabilizes
        #[arg(long, default_value_t = 0.73)]
        usage_percentage: f64,
        #[arg(long, default_value = "donnees_utilisateurs.csv")]
        out: PathBuf,
    },
    /// Filter, aggregate, and report KPIs from a usage CSV
    Report {
        #[arg(long, default_value = "donnees_utilisateurs.csv")]
        csv: PathBuf,
        /// Years to keep; defaults to every year present in the file
        #[arg(long, value_delimiter = ',')]
        years: Option<Vec<i32>>,
        /// Months (1-12) to keep; defaults to every month present in the file
        #[arg(long, value_delimiter = ',')]
        months: Option<Vec<u32>>,
        #[arg(long, value_enum, default_value = "day")]
        granularity: Granularity,
        /// Write the report here instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            start_date,
            days,
            target_users,
            usage_percentage,
            out,
        } => {
            let start = NaiveDate::parse_from_str(&start_date, dataset::DATE_FORMAT)
                .with_context(|| format!("invalid start date {start_date}, expected DD/MM/YYYY"))?;
            let mut rng = rand::thread_rng();
            let records =
                generate::generate(start, days, target_users, usage_percentage, &mut rng);
            dataset::write_csv(&out, &records)?;

            for record in records.iter().take(5) {
                if let Some(date) = record.date.as_date() {
                    println!(
                        "{} active {} potential {}",
                        date.format(dataset::DATE_FORMAT),
                        record.active_users,
                        record.potential_users
                    );
                }
            }
            println!("Wrote {} rows to {}.", records.len(), out.display());
        }
        Commands::Report {
            csv,
            years,
            months,
            granularity,
            out,
        } => {
            let records = dataset::load_csv(&csv)?;

            let years: BTreeSet<i32> = match years {
                Some(selected) => selected.into_iter().collect(),
                None => dataset::year_options(&records),
            };
            let months: BTreeSet<u32> = match months {
                Some(selected) => selected.into_iter().collect(),
                None => dataset::month_options(&records),
            };

            let filtered = dataset::filter_records(&records, &years, &months);
            let rows = kpi::annotate(aggregate::aggregate(&filtered, granularity));
            let report = report::build_report(granularity, &years, &months, &rows);

            match out {
                Some(path) => {
                    std::fs::write(&path, report)?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{report}"),
            }
        }
    }

    Ok(())
}
