use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(7);

    let territories = [
        "Antioquia",
        "Atlántico",
        "Bogotá D.C.",
        "Bolívar",
        "Caldas",
        "Cundinamarca",
        "Nariño",
        "Santander",
        "Valle del Cauca",
    ];
    let years: Vec<i64> = (2010..=2022).collect();

    let mut all_territory: Vec<String> = Vec::new();
    let mut all_year: Vec<i64> = Vec::new();
    let mut all_rate: Vec<f64> = Vec::new();

    for (idx, territory) in territories.iter().enumerate() {
        // Each territory gets its own base level and a mild yearly drift.
        let base = 4.0 + idx as f64 * 1.5;
        let drift = 0.1 + idx as f64 * 0.02;

        for &year in &years {
            let trend = base + drift * (year - years[0]) as f64;
            let rate = (trend + rng.gauss(0.0, 0.35)).max(0.0);

            all_territory.push(territory.to_string());
            all_year.push(year);
            all_rate.push(rate);
        }
    }

    let territory_array = StringArray::from(
        all_territory.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    );
    let year_array = Int64Array::from(all_year.clone());
    let rate_array = Float64Array::from(all_rate);

    let schema = Arc::new(Schema::new(vec![
        Field::new("Departamento", DataType::Utf8, false),
        Field::new("Año", DataType::Int64, false),
        Field::new("Tasa", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(territory_array),
            Arc::new(year_array),
            Arc::new(rate_array),
        ],
    )
    .context("building record batch")?;

    let output_path = "sample_indicators.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} indicator rows ({} territories x {} years) to {output_path}",
        all_year.len(),
        territories.len(),
        years.len()
    );

    Ok(())
}
