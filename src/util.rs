use crate::solve::Solve;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Clock-style time formatting: `s.cc` under a minute, `m:ss.cc`
/// above, `DNF` for an infinite adjusted time, `-` for anything not
/// representable.
pub fn format_time_ms(ms: f64) -> String {
    if ms == f64::INFINITY {
        return "DNF".to_string();
    }
    if !ms.is_finite() || ms < 0.0 {
        return "-".to_string();
    }

    let total_ms = ms.floor() as u64;
    let total_secs = total_ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let hundredths = (total_ms % 1000) / 10;

    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{hundredths:02}")
    } else {
        format!("{seconds}.{hundredths:02}")
    }
}

/// `-` when a statistic is not computable.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format_time_ms(v),
        None => "-".to_string(),
    }
}

/// A solve's display time: adjusted, with a trailing `+` marking a
/// penalized (but finished) attempt.
pub fn format_solve(solve: &Solve) -> String {
    if solve.is_dnf {
        return "DNF".to_string();
    }
    let mut formatted = format_time_ms(solve.adjusted_time_ms());
    if solve.penalty_units > 0 {
        formatted.push('+');
    }
    formatted
}
