//! Brazilian display formatting for phones, CRECI numbers and prices.

use realty_database::{ListingStatus, PropertyType};

pub const PRICE_ON_REQUEST: &str = "Consulte";

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Progressive phone mask over at most 11 digits, as typed:
/// `(8`, `(86) 999`, `(86) 99999-8888`.
pub fn format_phone(value: &str) -> String {
    let digits: Vec<char> = digits_only(value).chars().take(11).collect();
    let part = |from: usize, to: usize| -> String {
        digits[from.min(digits.len())..to.min(digits.len())].iter().collect()
    };

    match digits.len() {
        0 => String::new(),
        1..=2 => format!("({}", part(0, 2)),
        3..=7 => format!("({}) {}", part(0, 2), part(2, 7)),
        _ => format!("({}) {}-{}", part(0, 2), part(2, 7), part(7, 11)),
    }
}

/// Keep ASCII alphanumerics, upper-cased; past five characters the sixth
/// becomes a dash-separated suffix (`12345-F`).
pub fn format_creci(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.len() > 5 {
        format!("{}-{}", &cleaned[..5], &cleaned[5..6])
    } else {
        cleaned
    }
}

/// `R$ 850.000,00`: dot thousands separator, comma decimals.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}

pub fn display_price(price: Option<f64>) -> String {
    match price {
        Some(value) if value.is_finite() => format_brl(value),
        _ => PRICE_ON_REQUEST.to_string(),
    }
}

pub fn status_label(status: ListingStatus) -> &'static str {
    match status {
        ListingStatus::Available => "Disponível",
        ListingStatus::Unavailable => "Indisponível",
        ListingStatus::Sold => "Vendido",
        ListingStatus::Rented => "Alugado",
    }
}

pub fn type_label(kind: PropertyType) -> &'static str {
    match kind {
        PropertyType::House => "Casa",
        PropertyType::Apartment => "Apartamento",
        PropertyType::Penthouse => "Cobertura",
        PropertyType::Land => "Terreno",
        PropertyType::Commercial => "Comercial",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_mask_is_progressive() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("8"), "(8");
        assert_eq!(format_phone("86"), "(86");
        assert_eq!(format_phone("86999"), "(86) 999");
        assert_eq!(format_phone("8699999"), "(86) 99999");
        assert_eq!(format_phone("86999998888"), "(86) 99999-8888");
        assert_eq!(format_phone("(86) 99999-88881234"), "(86) 99999-8888");
    }

    #[test]
    fn creci_is_cleaned_and_suffixed() {
        assert_eq!(format_creci("12345f"), "12345-F");
        assert_eq!(format_creci("12.345-fx"), "12345-F");
        assert_eq!(format_creci("123"), "123");
        assert_eq!(format_creci(""), "");
    }

    #[test]
    fn brl_uses_brazilian_separators() {
        assert_eq!(format_brl(850_000.0), "R$ 850.000,00");
        assert_eq!(format_brl(1_200_000.5), "R$ 1.200.000,50");
        assert_eq!(format_brl(999.999), "R$ 1.000,00");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(-3_500.0), "-R$ 3.500,00");
    }

    #[test]
    fn missing_price_renders_consulte() {
        assert_eq!(display_price(None), "Consulte");
        assert_eq!(display_price(Some(480_000.0)), "R$ 480.000,00");
    }

    #[test]
    fn labels_are_portuguese() {
        assert_eq!(status_label(ListingStatus::Available), "Disponível");
        assert_eq!(type_label(PropertyType::Penthouse), "Cobertura");
    }
}
