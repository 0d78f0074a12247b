use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;

const ROWS: usize = 500;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// `n` consecutive weekdays starting at `start`.
fn business_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut day = start;
    while dates.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day = day + Days::new(1);
    }
    dates
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_default();
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2020, 1, 1).context("invalid start date")?;
    let dates = business_days(start, ROWS);

    // Shocks shared by the base metric and the metrics that follow it.
    let shocks: Vec<f64> = (0..ROWS).map(|_| rng.gauss(0.0, 0.6)).collect();

    let mut usdjpy = Vec::with_capacity(ROWS);
    let mut nikkei = Vec::with_capacity(ROWS);
    let mut gold = Vec::with_capacity(ROWS);
    let mut crude = Vec::with_capacity(ROWS);
    let mut policy = Vec::with_capacity(ROWS);

    let (mut fx, mut nk, mut au, mut oil) = (108.0, 23_000.0, 1_520.0, 61.0);
    for (i, &shock) in shocks.iter().enumerate() {
        fx += shock;
        nk += shock * 180.0 + rng.gauss(0.0, 40.0);
        au += -shock * 9.0 + rng.gauss(0.0, 2.0);
        oil += rng.gauss(0.0, 0.8);

        usdjpy.push(fx);
        nikkei.push(nk);
        gold.push(au);
        crude.push(oil);
        // Flat for long stretches, so rolling windows over it have no variance.
        policy.push(if i < ROWS / 2 { -0.10 } else { 0.25 });
    }

    let columns: [(&str, &Vec<f64>); 5] = [
        ("USDJPYEXClose", &usdjpy),
        ("NikkeiClose", &nikkei),
        ("GoldClose", &gold),
        ("CrudeClose", &crude),
        ("PolicyRate", &policy),
    ];

    // ---- CSV ----
    let csv_path = out_dir.join("sample_data.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    let mut header = vec!["Date".to_string()];
    header.extend(columns.iter().map(|(name, _)| name.to_string()));
    writer.write_record(&header)?;
    for (i, date) in dates.iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        row.extend(columns.iter().map(|(_, values)| format!("{:.4}", values[i])));
        writer.write_record(&row)?;
    }
    writer.flush()?;

    // ---- Parquet ----
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let days: Vec<i32> = dates.iter().map(|d| (*d - epoch).num_days() as i32).collect();

    let mut fields = vec![Field::new("Date", DataType::Date32, false)];
    fields.extend(columns.iter().map(|(name, _)| Field::new(*name, DataType::Float64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut arrays: Vec<Arc<dyn arrow::array::Array>> = vec![Arc::new(Date32Array::from(days))];
    arrays.extend(
        columns
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from((*values).clone())) as Arc<dyn arrow::array::Array>),
    );
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let parquet_path = out_dir.join("sample_data.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {ROWS} rows ({} metrics) to {} and {}",
        columns.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
