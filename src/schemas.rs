//! Declarative schemas for the records a user can submit.
//!
//! Each form mirrors the raw input of a dashboard form: every field is
//! optional so that a missing value is reported as a field error instead of a
//! deserialization failure. The `#[validate]` attributes are the rules; the
//! conversion into a validated record lives in [`crate::validation`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::models::{ClientStatus, MusicGenre, OpportunityStatus};
use crate::validation::is_valid_email;

pub const REQUIRED_MESSAGE: &str = "Ce champ est requis";
pub const INVALID_EMAIL_MESSAGE: &str = "Format d'email invalide";
pub const INVALID_RECIPIENT_MESSAGE: &str = "Adresse email destinataire invalide";
pub const INVALID_PHONE_MESSAGE: &str = "Format de téléphone français invalide";
pub const INVALID_GENRE_MESSAGE: &str = "Genre musical invalide";
pub const INVALID_CLIENT_STATUS_MESSAGE: &str = "Statut client invalide";
pub const INVALID_OPPORTUNITY_STATUS_MESSAGE: &str = "Statut d'opportunité invalide";

/// French mobile/landline number: `+33` or `0`, a non-zero digit, eight more digits.
static FRENCH_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+33|0)[1-9][0-9]{8}$").expect("french phone regex is valid")
});

/// Field order of each schema, used to report errors in declaration order.
pub const CLIENT_FIELDS: &[&str] = &[
    "nom",
    "email",
    "telephone",
    "genre_musical",
    "reseaux_sociaux.instagram",
    "reseaux_sociaux.spotify",
    "reseaux_sociaux.youtube",
    "newsletter_inscrit",
    "statut",
    "tags",
];
pub const EMAIL_FIELDS: &[&str] = &["to", "subject", "body", "clientId"];
pub const OPPORTUNITY_FIELDS: &[&str] = &[
    "client_id",
    "titre",
    "description",
    "mots_cles_triggers",
    "email_source_id",
    "statut",
];

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Matches a French phone number once whitespace is removed.
pub fn matches_french_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    FRENCH_PHONE_RE.is_match(&compact)
}

/// RFC-style address check plus a dotted domain (`user@localhost` is refused).
fn is_deliverable_address(email: &str) -> bool {
    email.validate_email() && is_valid_email(email)
}

fn validate_client_email(email: &str) -> Result<(), ValidationError> {
    if is_deliverable_address(email) {
        Ok(())
    } else {
        Err(rule_error("email", INVALID_EMAIL_MESSAGE))
    }
}

fn validate_recipient(email: &str) -> Result<(), ValidationError> {
    if is_deliverable_address(email) {
        Ok(())
    } else {
        Err(rule_error("email", INVALID_RECIPIENT_MESSAGE))
    }
}

fn max_chars(value: &str, max: usize, message: &'static str) -> Result<(), ValidationError> {
    if value.chars().count() <= max {
        Ok(())
    } else {
        Err(rule_error("length", message))
    }
}

fn validate_nom_max(nom: &str) -> Result<(), ValidationError> {
    max_chars(nom, 100, "Le nom ne peut pas dépasser 100 caractères")
}

fn validate_subject_max(subject: &str) -> Result<(), ValidationError> {
    max_chars(subject, 200, "Le sujet ne peut pas dépasser 200 caractères")
}

fn validate_body_max(body: &str) -> Result<(), ValidationError> {
    max_chars(body, 5000, "Le message ne peut pas dépasser 5000 caractères")
}

fn validate_titre_max(titre: &str) -> Result<(), ValidationError> {
    max_chars(titre, 200, "Le titre ne peut pas dépasser 200 caractères")
}

fn validate_french_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() || matches_french_phone(phone) {
        Ok(())
    } else {
        Err(rule_error("phone", INVALID_PHONE_MESSAGE))
    }
}

fn validate_genre(genre: &str) -> Result<(), ValidationError> {
    genre
        .parse::<MusicGenre>()
        .map(|_| ())
        .map_err(|_| rule_error("genre", INVALID_GENRE_MESSAGE))
}

fn validate_client_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<ClientStatus>()
        .map(|_| ())
        .map_err(|_| rule_error("statut", INVALID_CLIENT_STATUS_MESSAGE))
}

fn validate_opportunity_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<OpportunityStatus>()
        .map(|_| ())
        .map_err(|_| rule_error("statut", INVALID_OPPORTUNITY_STATUS_MESSAGE))
}

/// Social links as typed in the client form. Empty strings are stripped
/// before validation, so only present links are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SocialLinksForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL Instagram invalide"))]
    pub instagram: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL Spotify invalide"))]
    pub spotify: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "URL YouTube invalide"))]
    pub youtube: Option<String>,
}

impl SocialLinksForm {
    pub fn is_empty(&self) -> bool {
        self.instagram.is_none() && self.spotify.is_none() && self.youtube.is_none()
    }
}

/// Client creation/edition form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClientForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        length(min = 2, message = "Le nom doit faire au moins 2 caractères"),
        custom(function = "validate_nom_max")
    )]
    pub nom: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        custom(function = "validate_client_email"),
        length(max = 255, message = "L'email ne peut pas dépasser 255 caractères")
    )]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_french_phone"))]
    pub telephone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        custom(function = "validate_genre")
    )]
    pub genre_musical: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub reseaux_sociaux: Option<SocialLinksForm>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter_inscrit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_client_status"))]
    pub statut: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Compose-and-send email form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmailForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        custom(function = "validate_recipient")
    )]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        length(min = 1, message = "Le sujet est requis"),
        custom(function = "validate_subject_max")
    )]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        length(min = 1, message = "Le corps du message est requis"),
        custom(function = "validate_body_max")
    )]
    pub body: Option<String>,

    #[serde(rename = "clientId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Opportunity creation/edition form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OpportunityForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        length(min = 1, message = "ID client requis")
    )]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Ce champ est requis"),
        length(min = 3, message = "Le titre doit faire au moins 3 caractères"),
        custom(function = "validate_titre_max")
    )]
    pub titre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "La description ne peut pas dépasser 1000 caractères"))]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mots_cles_triggers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_opportunity_status"))]
    pub statut: Option<String>,
}
