//! Form validation for listings and broker profiles.
//!
//! Every failing field is reported at once; nothing is written while any
//! error remains.

use once_cell::sync::Lazy;
use realty_database::{
    BrokerProfileUpdate, ListingStatus, NewListing, PropertyType, WeeklySchedule,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::{digits_only, format_creci};

pub const REQUIRED: &str = "Campo obrigatório";
pub const INVALID_NUMBER: &str = "Informe um valor numérico maior ou igual a zero";
pub const INVALID_IMAGE: &str = "Imagem inválida: use uma URL http(s) ou uma imagem em base64";
pub const INVALID_OPTION: &str = "Opção inválida";
pub const INVALID_EMAIL: &str = "E-mail inválido";
pub const INVALID_PHONE: &str = "Telefone deve ter 10 ou 11 dígitos";
pub const INVALID_TIME: &str = "Horário deve estar no formato HH:MM";
pub const INVALID_TIME_RANGE: &str = "O horário de início deve ser anterior ao de término";

static EMAIL_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: &str) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Listing form as submitted by the admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub suites: Option<u32>,
    pub closets: Option<u32>,
    pub garage_spaces: Option<u32>,
    pub area: Option<f64>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

pub fn validate_listing(input: &ListingInput) -> Result<NewListing, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = required(&mut errors, "title", &input.title);
    let description = required(&mut errors, "description", &input.description);
    let city = required(&mut errors, "city", &input.city);

    let property_type = required(&mut errors, "property_type", &input.property_type)
        .and_then(|raw| parse_option(&mut errors, "property_type", &raw, PropertyType::parse));
    let status = required(&mut errors, "status", &input.status)
        .and_then(|raw| parse_option(&mut errors, "status", &raw, ListingStatus::parse));

    non_negative(&mut errors, "price", input.price);
    non_negative(&mut errors, "area", input.area);

    let images: Vec<String> = input
        .images
        .iter()
        .map(|image| image.trim().to_string())
        .filter(|image| !image.is_empty())
        .collect();
    for (index, image) in images.iter().enumerate() {
        if !is_http_url(image) && !is_data_image(image) {
            errors.push(format!("images[{index}]"), INVALID_IMAGE);
        }
    }

    let features = normalize_features(&input.features);

    match (title, description, city, property_type, status) {
        (Some(title), Some(description), Some(city), Some(property_type), Some(status))
            if errors.is_empty() =>
        {
            Ok(NewListing {
                title,
                description,
                price: input.price,
                neighborhood: trimmed(&input.neighborhood).unwrap_or_default(),
                city,
                address: trimmed(&input.address),
                bedrooms: input.bedrooms.unwrap_or(0),
                bathrooms: input.bathrooms.unwrap_or(0),
                suites: input.suites.unwrap_or(0),
                closets: input.closets.unwrap_or(0),
                garage_spaces: input.garage_spaces.unwrap_or(0),
                area: input.area,
                property_type,
                status,
                featured: input.featured.unwrap_or(false),
                images,
                features,
            })
        }
        _ => Err(errors),
    }
}

/// Trim, drop blanks and remove duplicates, keeping first occurrences.
pub fn normalize_features(features: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for feature in features.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if !seen.iter().any(|existing| existing.eq_ignore_ascii_case(feature)) {
            seen.push(feature.to_string());
        }
    }
    seen
}

pub fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}

/// `data:image/<subtype>;base64,<payload>` with a non-empty payload.
pub fn is_data_image(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return false;
    };
    match rest.split_once(";base64,") {
        Some((subtype, payload)) => !subtype.is_empty() && !payload.trim().is_empty(),
        None => false,
    }
}

/// Broker profile form as submitted by the admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub creci: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub whatsapp: Option<String>,
    pub facebook_username: Option<String>,
    pub instagram_username: Option<String>,
}

/// Validate and normalise a profile: phone and WhatsApp stored as digits,
/// CRECI formatted, social handles without a leading `@`.
pub fn validate_profile(input: &ProfileInput) -> Result<BrokerProfileUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", &input.name);

    let email = trimmed(&input.email).unwrap_or_default();
    if !email.is_empty() && !is_valid_email(&email) {
        errors.push("email", INVALID_EMAIL);
    }

    let phone = digits_only(input.phone.as_deref().unwrap_or_default());
    if !phone.is_empty() && !(10..=11).contains(&phone.len()) {
        errors.push("phone", INVALID_PHONE);
    }

    let whatsapp = trimmed(&input.whatsapp).map(|value| digits_only(&value));
    if whatsapp.as_ref().is_some_and(|digits| digits.len() < 10) {
        errors.push("whatsapp", INVALID_PHONE);
    }

    let photo_url = trimmed(&input.photo_url);
    if photo_url
        .as_deref()
        .is_some_and(|url| !is_http_url(url) && !is_data_image(url))
    {
        errors.push("photo_url", INVALID_IMAGE);
    }

    let handle = |value: &Option<String>| {
        trimmed(value)
            .map(|handle| handle.trim_start_matches('@').to_string())
            .filter(|handle| !handle.is_empty())
    };

    errors.into_result(|| BrokerProfileUpdate {
        name: name.unwrap_or_default(),
        creci: format_creci(input.creci.as_deref().unwrap_or_default()),
        phone,
        email,
        photo_url,
        whatsapp: whatsapp.filter(|digits| !digits.is_empty()),
        facebook_username: handle(&input.facebook_username),
        instagram_username: handle(&input.instagram_username),
    })
}

/// Active days need valid `HH:MM` times with start before end.
pub fn validate_schedule(schedule: &WeeklySchedule) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for (day, entry) in schedule.days() {
        if !entry.active {
            continue;
        }
        match (parse_time(&entry.start), parse_time(&entry.end)) {
            (Some(start), Some(end)) if start < end => {}
            (Some(_), Some(_)) => errors.push(format!("schedule.{day}"), INVALID_TIME_RANGE),
            _ => errors.push(format!("schedule.{day}"), INVALID_TIME),
        }
    }

    errors.into_result(|| ())
}

/// Minutes since midnight for a strict `HH:MM` value.
pub fn parse_time(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

pub fn is_valid_email(email: &str) -> bool {
    match EMAIL_REGEX.as_ref() {
        Ok(regex) => email.len() <= 255 && regex.is_match(email),
        Err(error) => {
            tracing::error!(%error, "email pattern failed to compile");
            false
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(errors: &mut ValidationErrors, field: &str, value: &Option<String>) -> Option<String> {
    let value = trimmed(value);
    if value.is_none() {
        errors.push(field, REQUIRED);
    }
    value
}

fn parse_option<T>(
    errors: &mut ValidationErrors,
    field: &str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let parsed = parse(raw);
    if parsed.is_none() {
        errors.push(field, INVALID_OPTION);
    }
    parsed
}

fn non_negative(errors: &mut ValidationErrors, field: &str, value: Option<f64>) {
    if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
        errors.push(field, INVALID_NUMBER);
    }
}
