use rust_decimal::{Decimal, RoundingStrategy};

/// Format a EUR amount with thousands separators, rounded to `dp` places
pub fn eur(amount: Decimal, dp: u32) -> String {
    format!("\u{20AC}{}", group_thousands(amount, dp))
}

/// Format a GBP amount with thousands separators and two decimals
pub fn gbp(amount: Decimal) -> String {
    format!("\u{00A3}{}", group_thousands(amount, 2))
}

/// Exchange rates are shown to four decimals
pub fn rate(rate: Decimal) -> String {
    format!(
        "{:.4}",
        rate.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn percent(pct: Decimal) -> String {
    format!("{}%", pct.normalize())
}

fn group_thousands(amount: Decimal, dp: u32) -> String {
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let formatted = format!("{:.*}", dp as usize, rounded);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
