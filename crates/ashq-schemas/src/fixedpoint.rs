/// A-share monetary and limit-price fields are rounded to two decimals
/// (CNY fen precision) whenever they cross a persistence or limit-price
/// boundary, after the limit formula is applied.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
