/// Validation and sanitization of dashboard input
///
/// This module turns raw forms into validated records:
/// 1. Normalize the form (trim, strip empty social links)
/// 2. Run the declarative schema rules
/// 3. Flatten rule failures into ordered (path, message) pairs
/// 4. Convert into the typed record accepted by the API client
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::models::{
    Client, ClientStatus, EmailDraft, MusicGenre, Opportunity, OpportunityStatus, SocialLinks,
};
use crate::schemas::{
    matches_french_phone, ClientForm, EmailForm, OpportunityForm, SocialLinksForm, CLIENT_FIELDS,
    EMAIL_FIELDS, INVALID_CLIENT_STATUS_MESSAGE, INVALID_GENRE_MESSAGE,
    INVALID_OPPORTUNITY_STATUS_MESSAGE, OPPORTUNITY_FIELDS, REQUIRED_MESSAGE,
};

static SIMPLE_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field, outermost first (`["reseaux_sociaux", "spotify"]`).
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new<P, S>(path: P, message: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Dotted form of the path (`reseaux_sociaux.spotify`).
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Ordered list of rule failures for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn single(field: &str, message: &str) -> Self {
        Self(vec![FieldError::new([field], message)])
    }

    /// Flattens `validator` output, ordering entries by the schema's field order.
    fn from_validator(errors: &ValidationErrors, field_order: &[&str]) -> Self {
        let mut flat = Vec::new();
        flatten_into(errors, &mut Vec::new(), &mut flat);

        // Stable sort keeps multiple failures of one field in rule order.
        flat.sort_by_key(|e| {
            let dotted = e.dotted_path();
            let rank = field_order
                .iter()
                .position(|f| *f == dotted)
                .unwrap_or(field_order.len());
            (rank, dotted)
        });
        Self(flat)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// True when some error targets exactly this dotted path.
    pub fn has_path(&self, dotted: &str) -> bool {
        self.0.iter().any(|e| e.dotted_path() == dotted)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_validation_errors(&self.0).join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn flatten_into(errors: &ValidationErrors, prefix: &mut Vec<String>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        prefix.push(field.to_string());
        match kind {
            ValidationErrorsKind::Field(rule_errors) => {
                for rule in rule_errors {
                    let message = rule
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| rule.code.to_string());
                    out.push(FieldError {
                        path: prefix.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_into(nested, prefix, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    prefix.push(index.to_string());
                    flatten_into(nested, prefix, out);
                    prefix.pop();
                }
            }
        }
        prefix.pop();
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string())
}

/// Empty strings in the social-link triple mean "not provided".
fn without_empty_links(links: &SocialLinksForm) -> SocialLinksForm {
    let keep = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    SocialLinksForm {
        instagram: keep(&links.instagram),
        spotify: keep(&links.spotify),
        youtube: keep(&links.youtube),
    }
}

/// Validates a client form and returns the record to submit.
///
/// The caller's form is left untouched. Empty social-link entries are
/// treated as absent, `nom` is trimmed before its length is checked and the
/// email is lower-cased once it is known to be valid.
pub fn validate_client_data(raw: &ClientForm) -> Result<Client, FieldErrors> {
    let mut form = raw.clone();
    form.reseaux_sociaux = form.reseaux_sociaux.as_ref().map(without_empty_links);
    form.nom = trimmed(&form.nom);

    form.validate()
        .map_err(|e| FieldErrors::from_validator(&e, CLIENT_FIELDS))?;

    let nom = form
        .nom
        .ok_or_else(|| FieldErrors::single("nom", REQUIRED_MESSAGE))?;
    let email = form
        .email
        .ok_or_else(|| FieldErrors::single("email", REQUIRED_MESSAGE))?
        .to_lowercase();
    let genre_musical = form
        .genre_musical
        .ok_or_else(|| FieldErrors::single("genre_musical", REQUIRED_MESSAGE))?
        .parse::<MusicGenre>()
        .map_err(|_| FieldErrors::single("genre_musical", INVALID_GENRE_MESSAGE))?;
    let statut = form
        .statut
        .map(|s| s.parse::<ClientStatus>())
        .transpose()
        .map_err(|_| FieldErrors::single("statut", INVALID_CLIENT_STATUS_MESSAGE))?;

    let reseaux_sociaux = form
        .reseaux_sociaux
        .map(|links| SocialLinks {
            instagram: links.instagram,
            spotify: links.spotify,
            youtube: links.youtube,
        })
        .filter(|links| !links.is_empty());

    Ok(Client {
        nom,
        email,
        telephone: form.telephone.filter(|t| !t.trim().is_empty()),
        genre_musical,
        reseaux_sociaux,
        newsletter_inscrit: form.newsletter_inscrit,
        statut,
        tags: form.tags,
    })
}

/// Validates an email draft; subject and body are trimmed first.
pub fn validate_email_data(raw: &EmailForm) -> Result<EmailDraft, FieldErrors> {
    let mut form = raw.clone();
    form.subject = trimmed(&form.subject);
    form.body = trimmed(&form.body);

    form.validate()
        .map_err(|e| FieldErrors::from_validator(&e, EMAIL_FIELDS))?;

    Ok(EmailDraft {
        to: form
            .to
            .ok_or_else(|| FieldErrors::single("to", REQUIRED_MESSAGE))?,
        subject: form
            .subject
            .ok_or_else(|| FieldErrors::single("subject", REQUIRED_MESSAGE))?,
        body: form
            .body
            .ok_or_else(|| FieldErrors::single("body", REQUIRED_MESSAGE))?,
        client_id: form.client_id,
    })
}

/// Validates an opportunity form; the title is trimmed first.
pub fn validate_opportunity_data(raw: &OpportunityForm) -> Result<Opportunity, FieldErrors> {
    let mut form = raw.clone();
    form.titre = trimmed(&form.titre);

    form.validate()
        .map_err(|e| FieldErrors::from_validator(&e, OPPORTUNITY_FIELDS))?;

    let statut = form
        .statut
        .map(|s| s.parse::<OpportunityStatus>())
        .transpose()
        .map_err(|_| FieldErrors::single("statut", INVALID_OPPORTUNITY_STATUS_MESSAGE))?;

    Ok(Opportunity {
        client_id: form
            .client_id
            .ok_or_else(|| FieldErrors::single("client_id", REQUIRED_MESSAGE))?,
        titre: form
            .titre
            .ok_or_else(|| FieldErrors::single("titre", REQUIRED_MESSAGE))?,
        description: form.description,
        mots_cles_triggers: form.mots_cles_triggers,
        email_source_id: form.email_source_id,
        statut,
    })
}

/// Human-readable label of a field path; unknown paths are returned as-is.
pub fn field_display_name(path: &str) -> &str {
    match path {
        "nom" => "Nom",
        "email" => "Email",
        "telephone" => "Téléphone",
        "genre_musical" => "Genre musical",
        "reseaux_sociaux.instagram" => "Instagram",
        "reseaux_sociaux.spotify" => "Spotify",
        "reseaux_sociaux.youtube" => "YouTube",
        "newsletter_inscrit" => "Newsletter",
        "to" => "Destinataire",
        "subject" => "Sujet",
        "body" => "Message",
        "titre" => "Titre",
        "description" => "Description",
        "client_id" => "Client",
        other => other,
    }
}

/// Formats errors for display as `"<Field>: <message>"`, keeping their order.
pub fn format_validation_errors(errors: &[FieldError]) -> Vec<String> {
    errors
        .iter()
        .map(|error| {
            if error.path.is_empty() {
                error.message.clone()
            } else {
                let path = error.dotted_path();
                format!("{}: {}", field_display_name(&path), error.message)
            }
        })
        .collect()
}

fn clean(value: &Option<String>, fold_case: bool) -> Option<String> {
    value
        .as_ref()
        .map(|v| {
            let v = v.trim();
            if fold_case {
                v.to_lowercase()
            } else {
                v.to_string()
            }
        })
        .filter(|v| !v.is_empty())
}

/// Cleans a client form before submission.
///
/// Returns a new form: strings are trimmed (and the email lower-cased),
/// blank optional fields are removed, and a social-link set with no links
/// left is dropped. Applying it twice yields the same form.
pub fn sanitize_client_data(data: &ClientForm) -> ClientForm {
    let reseaux_sociaux = data
        .reseaux_sociaux
        .as_ref()
        .map(|links| SocialLinksForm {
            instagram: clean(&links.instagram, false),
            spotify: clean(&links.spotify, false),
            youtube: clean(&links.youtube, false),
        })
        .filter(|links| !links.is_empty());

    ClientForm {
        nom: clean(&data.nom, false),
        email: clean(&data.email, true),
        telephone: clean(&data.telephone, false),
        genre_musical: clean(&data.genre_musical, false),
        reseaux_sociaux,
        newsletter_inscrit: data.newsletter_inscrit,
        statut: clean(&data.statut, false),
        tags: data.tags.clone(),
    }
}

/// Blank or absent URLs are accepted; anything else must parse as an absolute URL.
pub fn is_valid_url<'a>(url: impl Into<Option<&'a str>>) -> bool {
    match url.into() {
        None => true,
        Some(u) if u.trim().is_empty() => true,
        Some(u) => url::Url::parse(u).is_ok(),
    }
}

/// Loose `local@domain.tld` check used outside the schemas.
pub fn is_valid_email(email: &str) -> bool {
    SIMPLE_EMAIL_RE.is_match(email)
}

/// Blank or absent numbers are accepted; otherwise whitespace is ignored and
/// the number must be `+33`/`0` followed by nine digits, the first non-zero.
pub fn is_valid_french_phone<'a>(phone: impl Into<Option<&'a str>>) -> bool {
    match phone.into() {
        None => true,
        Some(p) if p.trim().is_empty() => true,
        Some(p) => matches_french_phone(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ClientForm {
        ClientForm {
            nom: Some("Nina Kraviz".to_string()),
            email: Some("Nina@Label.fr".to_string()),
            genre_musical: Some("électro".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_errors_follow_schema_order() {
        let form = ClientForm {
            genre_musical: Some("metal".to_string()),
            telephone: Some("12".to_string()),
            ..Default::default()
        };
        let errors = validate_client_data(&form).unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.dotted_path()).collect();
        assert_eq!(paths, vec!["nom", "email", "telephone", "genre_musical"]);
    }

    #[test]
    fn test_email_is_lowercased_after_validation() {
        let client = validate_client_data(&valid_form()).unwrap();
        assert_eq!(client.email, "nina@label.fr");
    }

    #[test]
    fn test_display_joins_formatted_messages() {
        let errors = FieldErrors(vec![
            FieldError::new(["nom"], "trop court"),
            FieldError::new(Vec::<String>::new(), "global"),
        ]);
        assert_eq!(errors.to_string(), "Nom: trop court; global");
    }

    #[test]
    fn test_nested_paths_are_dotted() {
        let mut form = valid_form();
        form.reseaux_sociaux = Some(SocialLinksForm {
            youtube: Some("pas une url".to_string()),
            ..Default::default()
        });
        let errors = validate_client_data(&form).unwrap_err();
        assert!(errors.has_path("reseaux_sociaux.youtube"));
        assert_eq!(
            format_validation_errors(errors.as_slice()),
            vec!["YouTube: URL YouTube invalide".to_string()]
        );
    }
}
