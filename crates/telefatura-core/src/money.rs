/// Round a monetary amount to two decimal places.
///
/// The result is the double closest to the correctly rounded decimal of the
/// exact binary value, with exact ties going to the even cent. Amounts are
/// rounded at every aggregation step, so this has to agree bit for bit with
/// the fixtures already produced by earlier generator versions.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Sum amounts left to right, starting from zero.
pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, value| acc + value)
}
