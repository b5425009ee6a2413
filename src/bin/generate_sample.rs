use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Parser;
use serde::Serialize;

use tabledash::cli::DEFAULT_DATA_PATH;

/// Write a synthetic sales CSV for the dashboard.
#[derive(Parser, Debug)]
#[command(name = "generate-sample", about = "Generate demo sales data")]
struct Args {
    /// Output CSV path
    #[arg(long, short = 'o', default_value = DEFAULT_DATA_PATH)]
    output: PathBuf,

    /// Number of days covered, starting 2024-01-01
    #[arg(long, default_value_t = 180)]
    days: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct SaleRow {
    date: NaiveDate,
    category: &'static str,
    region: &'static str,
    revenue: f64,
    units: u32,
    price: f64,
}

const CATEGORIES: [(&str, f64); 4] = [
    ("Books", 14.0),
    ("Electronics", 120.0),
    ("Home", 45.0),
    ("Toys", 25.0),
];
const REGIONS: [&str; 4] = ["East", "North", "South", "West"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        let span = u64::from(hi - lo) + 1;
        let offset = ((self.next_f64() * span as f64) as u64).min(span - 1);
        lo + offset as u32
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;
    let mut rows = 0usize;
    for day in 0..args.days {
        let date = start + Duration::days(i64::from(day));
        // Weekends sell a little more.
        let weekend = matches!(date.weekday().number_from_monday(), 6 | 7);
        for &(category, base_price) in &CATEGORIES {
            for &region in &REGIONS {
                if rng.next_f64() < 0.35 {
                    continue;
                }
                let price = (base_price * (0.85 + 0.3 * rng.next_f64()) * 100.0).round() / 100.0;
                let units = rng.range(1, if weekend { 14 } else { 9 });
                let revenue = (price * f64::from(units) * 100.0).round() / 100.0;
                writer
                    .serialize(SaleRow {
                        date,
                        category,
                        region,
                        revenue,
                        units,
                        price,
                    })
                    .context("writing row")?;
                rows += 1;
            }
        }
    }
    writer.flush().context("flushing CSV")?;

    log::info!("wrote {rows} rows to {}", args.output.display());
    println!("Generated {} ({rows} rows)", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_inclusive_at_the_extremes() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            let v = rng.range(3, 5);
            assert!((3..=5).contains(&v));
        }
        assert_eq!(rng.range(9, 9), 9);
        // Full span must not overflow.
        let _ = rng.range(0, u32::MAX);
        assert!(rng.range(u32::MAX - 1, u32::MAX) >= u32::MAX - 1);
    }
}
