/// JPY -> TWD. Adjust via `WARDROBE_EXCHANGE_RATE`.
pub const JPY_TO_TWD_RATE: f64 = 0.23;

/// Fixed-rate conversion, rounded half-to-even. `None` passes through.
pub fn convert(amount: Option<i64>, rate: f64) -> Option<i64> {
    let amount = amount?;
    Some((amount as f64 * rate).round_ties_even() as i64)
}

pub fn convert_default(amount: Option<i64>) -> Option<i64> {
    convert(amount, JPY_TO_TWD_RATE)
}
