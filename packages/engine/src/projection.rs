//! Present value of escalating annual losses.

/// Projection horizon in years.
pub const TIME_HORIZON_YEARS: u32 = 30;

/// Annual discount rate.
pub const DISCOUNT_RATE: f64 = 0.10;

/// Annual growth of climate losses.
pub const CLIMATE_ESCALATION: f64 = 0.02;

/// Present value of `annual_loss` growing at `escalation` per year and
/// discounted at `discount` per year, over `horizon` years:
///
/// `PV = Σ_{t=1..horizon} annual_loss · (1 + escalation)^(t-1) / (1 + discount)^t`
#[must_use]
pub fn present_value(annual_loss: f64, escalation: f64, discount: f64, horizon: u32) -> f64 {
    let mut growth = 1.0;
    let mut discount_factor = 1.0;
    let mut total = 0.0;

    for _ in 0..horizon {
        discount_factor *= 1.0 + discount;
        total += annual_loss * growth / discount_factor;
        growth *= 1.0 + escalation;
    }

    total
}

/// Present value with the fixed model rates and horizon.
#[must_use]
pub fn standard_present_value(annual_loss: f64) -> f64 {
    present_value(
        annual_loss,
        CLIMATE_ESCALATION,
        DISCOUNT_RATE,
        TIME_HORIZON_YEARS,
    )
}
