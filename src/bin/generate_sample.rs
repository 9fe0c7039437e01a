use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Candidate ideal functions, written as columns y1..yN of ideal.csv.
fn ideal_functions() -> [fn(f64) -> f64; 12] {
    [
        |x: f64| x,
        |x: f64| -x,
        |x: f64| 2.0 * x + 3.0,
        |x: f64| x * x,
        |x: f64| -0.5 * x * x + 4.0,
        |x: f64| x.powi(3) / 20.0,
        |x: f64| x.sin(),
        |x: f64| x.cos() * 3.0,
        |x: f64| (x / 4.0).exp(),
        |x: f64| x.abs().sqrt(),
        |x: f64| (x * 0.5).sin() * x,
        |x: f64| 10.0 - x,
    ]
}

/// Ideal columns the training series are drawn from (0-based).
const TRAINING_SOURCES: [usize; 4] = [2, 4, 6, 10];

fn write_columns(path: &Path, names: &[String], columns: &[Vec<f64>]) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    w.write_record(names)?;
    for row in 0..columns[0].len() {
        w.write_record(columns.iter().map(|c| c[row].to_string()))?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // x: -20.0 → 19.9, step 0.1
    let xs: Vec<f64> = (0..400).map(|i| -20.0 + i as f64 * 0.1).collect();
    let ideals = ideal_functions();

    // ---- ideal.csv ----
    let mut names = vec!["x".to_string()];
    let mut columns = vec![xs.clone()];
    for (i, f) in ideals.iter().enumerate() {
        names.push(format!("y{}", i + 1));
        columns.push(xs.iter().map(|&x| f(x)).collect());
    }
    write_columns(&out_dir.join("ideal.csv"), &names, &columns)?;

    // ---- train.csv ----
    let mut names = vec!["x".to_string()];
    let mut columns = vec![xs.clone()];
    for (i, &src) in TRAINING_SOURCES.iter().enumerate() {
        names.push(format!("y{}", i + 1));
        let f = ideals[src];
        columns.push(xs.iter().map(|&x| f(x) + rng.gauss(0.0, 0.3)).collect());
    }
    write_columns(&out_dir.join("train.csv"), &names, &columns)?;

    // ---- test.csv ----
    // Mostly points near one of the training sources, some pure noise.
    let mut test_x = Vec::with_capacity(100);
    let mut test_y = Vec::with_capacity(100);
    for _ in 0..100 {
        let x = xs[rng.below(xs.len())];
        let y = if rng.next_f64() < 0.8 {
            let f = ideals[TRAINING_SOURCES[rng.below(TRAINING_SOURCES.len())]];
            f(x) + rng.gauss(0.0, 0.2)
        } else {
            rng.gauss(0.0, 25.0)
        };
        test_x.push(x);
        test_y.push(y);
    }
    write_columns(
        &out_dir.join("test.csv"),
        &["x".to_string(), "y".to_string()],
        &[test_x, test_y],
    )?;

    println!(
        "Wrote ideal.csv ({} functions), train.csv ({} series), test.csv (100 points) to {}",
        ideals.len(),
        TRAINING_SOURCES.len(),
        out_dir.display()
    );
    Ok(())
}
