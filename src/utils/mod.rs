//! Utility functions for formatting prices
//!
//! This module provides centralized formatting utilities for consistent
//! display of hryvnia amounts in CLI output.

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Append " грн" (Ukrainian hryvnia)
    UAH,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a price using Ukrainian locale conventions:
/// - Thousands separator: ` ` (space)
/// - Decimal separator: `,` (comma)
///
/// # Arguments
/// * `value` - The price to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `symbol` - Whether to include the currency symbol
///
/// # Examples
/// ```
/// use bondwatch::utils::{format_price_with_width, CurrencySymbol};
///
/// assert_eq!(
///     format_price_with_width(1234.56, 0, CurrencySymbol::UAH),
///     "1 234,56 грн"
/// );
///
/// assert_eq!(
///     format_price_with_width(1234.0, 12, CurrencySymbol::None),
///     "    1 234,00"
/// );
/// ```
pub fn format_price_with_width(value: f64, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < 0.0;

    // Round to 2 decimal places and format
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators (space) to integer part
    let digits: Vec<char> = integer_part.chars().collect();
    let mut with_separators = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            with_separators.push(' ');
        }
        with_separators.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    let suffix = match symbol {
        CurrencySymbol::UAH => " грн",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{},{}{}", sign, with_separators, decimal_part, suffix);

    // Apply width padding (right-align); count chars, not bytes
    let len = result.chars().count();
    if width > len {
        format!("{}{}", " ".repeat(width - len), result)
    } else {
        result
    }
}

/// Format as hryvnia with symbol: "1 234,56 грн"
pub fn format_price(value: f64) -> String {
    format_price_with_width(value, 0, CurrencySymbol::UAH)
}

/// Format number only (no symbol): "1 234,56"
pub fn format_price_plain(value: f64) -> String {
    format_price_with_width(value, 0, CurrencySymbol::None)
}
