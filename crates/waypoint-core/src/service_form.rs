//! Validation of the service listing form.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Place,
    Activity,
    Food,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [Self::Place, Self::Activity, Self::Food];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Activity => "activity",
            Self::Food => "food",
        }
    }
}

impl FromStr for ServiceType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(FieldError::InvalidType)
    }
}

/// Form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceField {
    Type,
    Name,
    Description,
    PricePerSession,
    AvailableDays,
    OpeningTime,
    ClosingTime,
    Slots,
}

impl fmt::Display for ServiceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Type => "type",
            Self::Name => "name",
            Self::Description => "description",
            Self::PricePerSession => "pricePerSession",
            Self::AvailableDays => "availableDays",
            Self::OpeningTime => "openingTime",
            Self::ClosingTime => "closingTime",
            Self::Slots => "slots",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldError {
    #[error("Required")]
    Required,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Invalid hour")]
    InvalidHour,
    #[error("Invalid service type")]
    InvalidType,
}

/// Raw form input as typed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDraft {
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_per_session: Option<String>,
    pub available_days: BTreeSet<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub slots: Option<String>,
}

/// A validated listing, ready to submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub name: String,
    pub description: String,
    pub price_per_session: f64,
    pub available_days: BTreeSet<String>,
    pub opening_time: u8,
    pub closing_time: u8,
    pub slots: u32,
}

/// Per-field errors. Only the first problem of each field is reported.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<ServiceField, FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: ServiceField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServiceField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    fn insert(&mut self, field: ServiceField, error: FieldError) {
        self.0.entry(field).or_insert(error);
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ServiceDraft {
    /// Validates the draft and converts it into a listing.
    pub fn validate(&self) -> Result<ServiceListing, FormErrors> {
        let mut errors = FormErrors::default();

        let service_type = match present(&self.service_type) {
            None => {
                errors.insert(ServiceField::Type, FieldError::Required);
                None
            }
            Some(raw) => raw
                .parse::<ServiceType>()
                .map_err(|e| errors.insert(ServiceField::Type, e))
                .ok(),
        };

        let name = required_text(&self.name, ServiceField::Name, &mut errors);
        let description = required_text(&self.description, ServiceField::Description, &mut errors);

        let price_per_session = required_number::<f64>(
            &self.price_per_session,
            ServiceField::PricePerSession,
            &mut errors,
        );

        if self.available_days.is_empty() {
            errors.insert(ServiceField::AvailableDays, FieldError::Required);
        }

        let opening_time = required_hour(&self.opening_time, ServiceField::OpeningTime, &mut errors);
        let closing_time = required_hour(&self.closing_time, ServiceField::ClosingTime, &mut errors);
        let slots = required_number::<u32>(&self.slots, ServiceField::Slots, &mut errors);

        match (
            service_type,
            name,
            description,
            price_per_session,
            opening_time,
            closing_time,
            slots,
        ) {
            (
                Some(service_type),
                Some(name),
                Some(description),
                Some(price_per_session),
                Some(opening_time),
                Some(closing_time),
                Some(slots),
            ) if errors.is_empty() => Ok(ServiceListing {
                service_type,
                name,
                description,
                price_per_session,
                available_days: self.available_days.clone(),
                opening_time,
                closing_time,
                slots,
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(value: &Option<String>, field: ServiceField, errors: &mut FormErrors) -> Option<String> {
    let text = present(value).map(str::to_string);
    if text.is_none() {
        errors.insert(field, FieldError::Required);
    }
    text
}

fn required_number<T: FromStr>(
    value: &Option<String>,
    field: ServiceField,
    errors: &mut FormErrors,
) -> Option<T> {
    let Some(raw) = present(value) else {
        errors.insert(field, FieldError::Required);
        return None;
    };
    raw.parse::<T>()
        .map_err(|_| errors.insert(field, FieldError::InvalidNumber))
        .ok()
}

fn required_hour(value: &Option<String>, field: ServiceField, errors: &mut FormErrors) -> Option<u8> {
    let Some(raw) = present(value) else {
        errors.insert(field, FieldError::Required);
        return None;
    };
    match raw.parse::<u8>() {
        Ok(hour) if hour <= 23 => Some(hour),
        _ => {
            errors.insert(field, FieldError::InvalidHour);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ServiceDraft {
        ServiceDraft {
            service_type: Some("activity".into()),
            name: Some("Surf lesson".into()),
            description: Some("Two hours on the board".into()),
            price_per_session: Some("45.5".into()),
            available_days: ["Mon".to_string(), "Sat".to_string()].into(),
            opening_time: Some("8".into()),
            closing_time: Some("18".into()),
            slots: Some("6".into()),
        }
    }

    #[test]
    fn test_complete_draft_validates() {
        let listing = complete().validate().unwrap();
        assert_eq!(listing.service_type, ServiceType::Activity);
        assert_eq!(listing.price_per_session, 45.5);
        assert_eq!(listing.opening_time, 8);
        assert_eq!(listing.slots, 6);
    }

    #[test]
    fn test_empty_draft_reports_every_required_field() {
        let errors = ServiceDraft::default().validate().unwrap_err();
        assert_eq!(errors.iter().count(), 8);
        assert!(errors.iter().all(|(_, error)| error == FieldError::Required));
    }

    #[test]
    fn test_numeric_and_hour_fields() {
        let mut draft = complete();
        draft.price_per_session = Some("cheap".into());
        draft.slots = Some("-1".into());
        draft.opening_time = Some("24".into());

        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.get(ServiceField::PricePerSession), Some(FieldError::InvalidNumber));
        assert_eq!(errors.get(ServiceField::Slots), Some(FieldError::InvalidNumber));
        assert_eq!(errors.get(ServiceField::OpeningTime), Some(FieldError::InvalidHour));
        assert_eq!(errors.get(ServiceField::ClosingTime), None);
        assert_eq!(
            errors.to_string(),
            "pricePerSession: Invalid number, openingTime: Invalid hour, slots: Invalid number"
        );
    }

    #[test]
    fn test_service_type_is_case_insensitive() {
        assert_eq!("Food".parse::<ServiceType>(), Ok(ServiceType::Food));
        assert_eq!("bar".parse::<ServiceType>(), Err(FieldError::InvalidType));
    }
}
