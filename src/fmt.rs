/// Group the integer part with commas, two decimals: 1,234.56
pub fn grouped(val: f64) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Amount followed by its currency code: -1,234.56 EUR
pub fn amount(val: f64, currency: &str) -> String {
    format!("{} {currency}", grouped(val))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_formatting() {
        assert_eq!(grouped(1234.56), "1,234.56");
        assert_eq!(grouped(-500.00), "-500.00");
        assert_eq!(grouped(0.0), "0.00");
        assert_eq!(grouped(-0.001), "0.00");
        assert_eq!(grouped(1000000.99), "1,000,000.99");
    }

    #[test]
    fn test_amount_with_currency() {
        assert_eq!(amount(42.1, "EUR"), "42.10 EUR");
        assert_eq!(amount(-2500.0, "GBP"), "-2,500.00 GBP");
    }
}
