pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0_f64
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn demean(values: &[f64]) -> Vec<f64> {
    let mean = mean(values);
    values.iter().map(|v| v - mean).collect()
}

/// Centered moving average. Each output is the mean of the samples within
/// `half_width` of it, truncated at the edges.
pub fn moving_average(values: &[f64], half_width: usize) -> Vec<f64> {
    let Some(last) = values.len().checked_sub(1) else {
        return vec![];
    };

    (0..values.len())
        .map(|i| {
            let window = &values[i.saturating_sub(half_width)..=(i + half_width).min(last)];
            mean(window)
        })
        .collect()
}

/// Length-normalized autocorrelation of `values` at `lag`.
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag >= n {
        return 0_f64;
    }

    let sum = values
        .iter()
        .zip(&values[lag..])
        .map(|(a, b)| a * b)
        .sum::<f64>();
    sum / (n - lag) as f64
}
