//! Moving averages and related helpers over plain `f64` series (oldest first)

/// Simple moving average of the last `period` values
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// One EMA step
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let k = 2.0 / (period as f64 + 1.0);
    value * k + previous * (1.0 - k)
}

/// Exponential moving average, seeded with the SMA of the first `period` values
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, &v| ema_from_previous(v, prev, period)),
    )
}

/// `(to - from) / |from|`; `None` when `from` is zero
pub fn relative_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    Some((to - from) / from.abs())
}
