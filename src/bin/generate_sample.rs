use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Write a sales table to try the dashboard with:
/// `date, region, product, units, unit_price, revenue`.
fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_sales.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = [("Widget", 4.5), ("Gadget", 12.0), ("Gizmo", 27.5)];
    let product_names: Vec<&str> = products.iter().map(|(name, _)| *name).collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["date", "region", "product", "units", "unit_price", "revenue"])?;

    let mut rows = 0;
    for day in 0..180 {
        let date = start + Duration::days(day);
        // A weekly cycle on top of slow growth.
        let season = 1.0 + 0.3 * (day as f64 * std::f64::consts::TAU / 7.0).sin() + day as f64 / 360.0;

        for _ in 0..3 {
            let region = rng.pick(&regions);
            let product = rng.pick(&product_names);
            let price = products
                .iter()
                .find(|(name, _)| *name == product)
                .map_or(1.0, |(_, price)| *price);
            let units = rng.gauss(20.0 * season, 5.0).round().max(0.0) as i64;
            let revenue = (units as f64 * price * 100.0).round() / 100.0;

            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                region.to_string(),
                product.to_string(),
                units.to_string(),
                format!("{price:.2}"),
                format!("{revenue:.2}"),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    log::info!("sample generated with seed 42");
    println!("Wrote {rows} rows to {output_path}");
    Ok(())
}
