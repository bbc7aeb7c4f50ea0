//! Display formatting for Crore-denominated amounts.
//!
//! Amounts are shown either in Crores (`₹ 12.00 Cr`) or as full rupee values
//! with Indian digit grouping (`₹12,00,00,000.00`).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{clamped_mul, round_half_up};

/// Currency units in one Crore.
pub const CRORE: Decimal = dec!(10000000);

/// `₹ 12.00 Cr`. Negative amounts put the sign before the rupee symbol,
/// as [`format_inr`] does: `-₹ 410.00 Cr`.
pub fn format_crore(crores: Decimal) -> String {
    let crores = round_half_up(crores);
    format!("{}₹ {:.2} Cr", sign(crores), crores.abs())
}

/// The full rupee value of `crores`, grouped the Indian way.
///
/// ```
/// use rust_decimal_macros::dec;
/// use bid_core::format::format_inr;
///
/// assert_eq!(format_inr(dec!(12.5)), "₹12,50,00,000.00");
/// assert_eq!(format_inr(dec!(-0.0001)), "-₹1,000.00");
/// ```
pub fn format_inr(crores: Decimal) -> String {
    let rupees = round_half_up(clamped_mul(crores, CRORE));
    format!("{}₹{}", sign(rupees), group_indian(rupees.abs()))
}

fn sign(value: Decimal) -> &'static str {
    if value < Decimal::ZERO { "-" } else { "" }
}

/// Two-decimal rendering of a non-negative value with lakh/crore grouping:
/// the last three integer digits, then pairs.
fn group_indian(value: Decimal) -> String {
    let text = format!("{:.2}", round_half_up(value));
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    if digits.len() <= 3 {
        grouped.push_str(int_part);
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        for (i, c) in head.iter().enumerate() {
            if i > 0 && (head.len() - i) % 2 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }
        grouped.push(',');
        grouped.extend(tail);
    }

    format!("{grouped}.{frac_part}")
}
