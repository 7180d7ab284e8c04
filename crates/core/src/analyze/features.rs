//! Scalar acoustic features over a window of normalized mono samples.

/// Plausible band for a speaking voice's fundamental frequency.
const PITCH_MIN_HZ: f64 = 60.0;
const PITCH_MAX_HZ: f64 = 400.0;

/// Correlation below this is treated as unvoiced (no usable pitch).
const VOICING_THRESHOLD: f64 = 0.5;

/// Root-mean-square energy, 0.0 for silence up to ~1.0 for full scale.
pub fn rms_energy(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Fraction of adjacent sample pairs crossing zero; a rough proxy for
/// voicing versus noisiness.
pub fn zero_crossing_rate(samples: &[f32]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0usize;
    for pair in samples.windows(2) {
        if (pair[0] >= 0.0 && pair[1] < 0.0) || (pair[0] < 0.0 && pair[1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f64 / samples.len() as f64
}

/// Fundamental-frequency estimate via normalized autocorrelation over the
/// 60-400 Hz band. Returns 0.0 when the window is silent, too short, or no
/// lag correlates strongly enough to call the window voiced.
pub fn pitch_autocorrelation(samples: &[f32], sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    let sr = f64::from(sample_rate);
    let min_lag = (sr / PITCH_MAX_HZ).floor() as usize;
    let max_lag = (sr / PITCH_MIN_HZ).ceil() as usize;
    if min_lag == 0 || samples.len() < max_lag * 2 {
        return 0.0;
    }

    let energy = rms_energy(samples);
    if energy <= f64::EPSILON {
        return 0.0;
    }

    let n = samples.len();
    let mut best_corr = 0.0f64;
    let mut correlations = Vec::with_capacity(max_lag - min_lag + 1);
    for lag in min_lag..=max_lag {
        let len = n - lag;
        let mut cross = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for i in 0..len {
            let a = f64::from(samples[i]);
            let b = f64::from(samples[i + lag]);
            cross += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }
        let denom = (norm_a * norm_b).sqrt();
        let corr = if denom > 0.0 { cross / denom } else { 0.0 };
        correlations.push((lag, corr));
        if corr > best_corr {
            best_corr = corr;
        }
    }

    if best_corr < VOICING_THRESHOLD {
        return 0.0;
    }

    // The smallest strongly-correlated peak wins, so one period is preferred
    // over its multiples.
    let interior_peak = correlations
        .windows(3)
        .find(|w| {
            let (_, c) = w[1];
            c >= w[0].1 && c >= w[2].1 && c >= best_corr * 0.99
        })
        .map(|w| w[1].0);
    let chosen = interior_peak.or_else(|| {
        correlations
            .iter()
            .find(|(_, c)| *c >= best_corr)
            .map(|(lag, _)| *lag)
    });

    match chosen {
        Some(lag) if lag > 0 => sr / lag as f64,
        _ => 0.0,
    }
}
