/// Checks that a numerical value is in the provided interval `[a,b]`, returning an
/// [`Error::InvalidParameter`](crate::Error::InvalidParameter) from the enclosing function if not
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns early with the message "invalid value 2 for \`alpha\`: must be in the interval \[0, 1\]".
#[macro_export]
macro_rules! ensure_interval {
    ($var:expr, $a:expr, $b:expr) => {
        if !($var >= $a && $var <= $b) {
            return Err($crate::Error::InvalidParameter {
                name: stringify!($var),
                value: $var as f64,
                detail: format!("must be in the interval [{}, {}]", $a, $b),
            });
        }
    };
}

/// Position of the first minimum of `values`; NaN entries only win if nothing else is comparable
pub(crate) fn argmin_first<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if !b.is_nan() && !(v < b) => {}
            Some(_) if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
