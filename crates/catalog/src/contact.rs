//! Outbound contact links: WhatsApp chats, e-mail drafts and map searches.

use realty_database::{BrokerProfile, Listing};
use serde::Serialize;

use crate::format::digits_only;

const BRAZIL_COUNTRY_CODE: &str = "55";
const WHATSAPP_BASE: &str = "https://wa.me/";
const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";
const MAPS_DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1&destination=";

/// Links a visitor can follow to reach a broker about a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactLinks {
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub maps_search: Option<String>,
    pub maps_directions: Option<String>,
}

/// Digits with the Brazilian country code; numbers of up to 11 digits are
/// national and get `55` prepended.
pub fn whatsapp_number(phone: &str) -> Option<String> {
    let digits = digits_only(phone);
    match digits.len() {
        0 => None,
        1..=11 => Some(format!("{BRAZIL_COUNTRY_CODE}{digits}")),
        _ => Some(digits),
    }
}

pub fn whatsapp_link(phone: &str, message: &str) -> Option<String> {
    whatsapp_number(phone).map(|number| {
        format!("{WHATSAPP_BASE}{number}?text={}", urlencoding::encode(message))
    })
}

pub fn general_inquiry(broker_name: &str) -> String {
    format!("Olá {broker_name}! Gostaria de mais informações sobre os imóveis disponíveis.")
}

pub fn listing_inquiry(broker_name: &str, listing: &Listing) -> String {
    format!(
        "Olá {broker_name}! Tenho interesse no imóvel: {} (Ref: {}). Gostaria de mais informações.",
        listing.title, listing.id
    )
}

pub fn mailto_link(email: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        email.trim(),
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

pub fn maps_search_link(address: &str) -> String {
    format!("{MAPS_SEARCH_BASE}{}", urlencoding::encode(address.trim()))
}

pub fn maps_directions_link(address: &str) -> String {
    format!("{MAPS_DIRECTIONS_BASE}{}", urlencoding::encode(address.trim()))
}

/// The full address used for maps, falling back to neighborhood and city.
pub fn listing_address(listing: &Listing) -> String {
    match listing.address.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) => address.to_string(),
        None => [listing.neighborhood.trim(), listing.city.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn broker_phone(broker: &BrokerProfile) -> &str {
    broker
        .whatsapp
        .as_deref()
        .filter(|number| !digits_only(number).is_empty())
        .unwrap_or(&broker.phone)
}

/// WhatsApp link for a general question to `broker`.
pub fn broker_contact(broker: &BrokerProfile) -> ContactLinks {
    let email = (!broker.email.trim().is_empty()).then(|| {
        mailto_link(
            &broker.email,
            "Contato pelo site",
            &general_inquiry(&broker.name),
        )
    });

    ContactLinks {
        whatsapp: whatsapp_link(broker_phone(broker), &general_inquiry(&broker.name)),
        email,
        maps_search: None,
        maps_directions: None,
    }
}

/// WhatsApp, e-mail and map links for asking `broker` about `listing`.
pub fn listing_contact(broker: &BrokerProfile, listing: &Listing) -> ContactLinks {
    let subject = format!("Interesse no imóvel: {} (Ref: {})", listing.title, listing.id);
    let body = format!(
        "Olá {},\n\nTenho interesse no imóvel \"{}\" e gostaria de mais informações.\n\nAguardo retorno.\n\nObrigado(a)!",
        broker.name, listing.title
    );
    let email = (!broker.email.trim().is_empty()).then(|| mailto_link(&broker.email, &subject, &body));

    let address = listing_address(listing);
    let (maps_search, maps_directions) = if address.is_empty() {
        (None, None)
    } else {
        (
            Some(maps_search_link(&address)),
            Some(maps_directions_link(&address)),
        )
    };

    ContactLinks {
        whatsapp: whatsapp_link(broker_phone(broker), &listing_inquiry(&broker.name, listing)),
        email,
        maps_search,
        maps_directions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{broker, listing};

    #[test]
    fn national_numbers_get_country_code() {
        assert_eq!(whatsapp_number("(86) 99999-8888").as_deref(), Some("5586999998888"));
        assert_eq!(whatsapp_number("5586999998888").as_deref(), Some("5586999998888"));
        assert_eq!(whatsapp_number("sem número"), None);
    }

    #[test]
    fn whatsapp_link_encodes_message() {
        let link = whatsapp_link("86999998888", &general_inquiry("Genilson")).unwrap();
        assert_eq!(
            link,
            "https://wa.me/5586999998888?text=Ol%C3%A1%20Genilson%21%20Gostaria%20de%20mais%20informa%C3%A7%C3%B5es%20sobre%20os%20im%C3%B3veis%20dispon%C3%ADveis."
        );
    }

    #[test]
    fn listing_inquiry_mentions_title_and_reference() {
        let item = listing("abc123", "Casa no Jóquei", "Jóquei", "Teresina", None);
        assert_eq!(
            listing_inquiry("Genilson", &item),
            "Olá Genilson! Tenho interesse no imóvel: Casa no Jóquei (Ref: abc123). Gostaria de mais informações."
        );
    }

    #[test]
    fn maps_links_encode_address() {
        assert_eq!(
            maps_search_link("Rua A, 10 - Teresina"),
            "https://www.google.com/maps/search/?api=1&query=Rua%20A%2C%2010%20-%20Teresina"
        );
        assert_eq!(
            maps_directions_link("Centro"),
            "https://www.google.com/maps/dir/?api=1&destination=Centro"
        );
    }

    #[test]
    fn listing_contact_prefers_whatsapp_number_and_full_address() {
        let mut profile = broker("Genilson", "12345-F");
        profile.whatsapp = Some("5586988887777".into());
        let mut item = listing("abc", "Casa", "Jóquei", "Teresina", None);
        item.address = Some("Rua das Palmeiras, 100".into());

        let links = listing_contact(&profile, &item);
        assert!(links.whatsapp.unwrap().starts_with("https://wa.me/5586988887777?text="));
        assert!(links.email.unwrap().starts_with("mailto:genilson@example.com?subject="));
        assert!(links.maps_search.unwrap().ends_with("Rua%20das%20Palmeiras%2C%20100"));
    }

    #[test]
    fn address_falls_back_to_neighborhood_and_city() {
        let item = listing("abc", "Casa", "Jóquei", "Teresina", None);
        assert_eq!(listing_address(&item), "Jóquei, Teresina");
    }
}
