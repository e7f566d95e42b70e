/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    // NaN/inf render without a decimal point and would break the split below.
    if !val.is_finite() {
        return format!("${val}");
    }
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Signed variant for balance deltas: +$10.00 / -$10.00.
pub fn money_delta(val: f64) -> String {
    if val >= 0.0 {
        format!("+{}", money(val))
    } else {
        money(val)
    }
}
