//! Records exchanged with the CRM backend.
//!
//! Write-side records (`Client`, `EmailDraft`, `Opportunity`) can only be
//! obtained through [`crate::validation`], so anything handed to
//! [`crate::api_client::ApiService`] has already passed its schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a closed enumeration whose wire form is a fixed string per variant.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:expr, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation of the variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum!(
    /// Music genre attached to a client.
    MusicGenre, "music genre", {
        Rap => "rap",
        Pop => "pop",
        Rock => "rock",
        Electro => "électro",
        RnB => "r&b",
        Jazz => "jazz",
        Autre => "autre",
    }
);

wire_enum!(
    /// Commercial relationship with a client (prospect, active, former).
    ClientStatus, "client status", {
        Prospect => "prospect",
        ClientActif => "client_actif",
        AncienClient => "ancien_client",
    }
);

wire_enum!(
    /// Lifecycle of a sales opportunity (new, in progress, qualified, lost).
    OpportunityStatus, "opportunity status", {
        Nouveau => "nouveau",
        EnCours => "en_cours",
        Qualifie => "qualifie",
        Perdu => "perdu",
    }
);

/// Social-media links of an artist; each entry is a well-formed URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) spotify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) youtube: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.instagram.is_none() && self.spotify.is_none() && self.youtube.is_none()
    }

    pub fn instagram(&self) -> Option<&str> {
        self.instagram.as_deref()
    }

    pub fn spotify(&self) -> Option<&str> {
        self.spotify.as_deref()
    }

    pub fn youtube(&self) -> Option<&str> {
        self.youtube.as_deref()
    }
}

/// A client record that passed the client schema.
///
/// Fields are read-only outside the crate; a record can only come from
/// [`crate::validation::validate_client_data`].
///
/// ```compile_fail
/// use mdmc_crm::models::{Client, MusicGenre};
///
/// let client = Client {
///     nom: String::new(),
///     email: "NOT AN EMAIL".to_string(),
///     telephone: Some("123".to_string()),
///     genre_musical: MusicGenre::Rap,
///     reseaux_sociaux: None,
///     newsletter_inscrit: None,
///     statut: None,
///     tags: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub(crate) nom: String,
    pub(crate) email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) telephone: Option<String>,
    pub(crate) genre_musical: MusicGenre,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reseaux_sociaux: Option<SocialLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) newsletter_inscrit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) statut: Option<ClientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tags: Option<Vec<String>>,
}

impl Client {
    pub fn nom(&self) -> &str {
        &self.nom
    }

    /// Lower-cased address.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn telephone(&self) -> Option<&str> {
        self.telephone.as_deref()
    }

    pub fn genre_musical(&self) -> MusicGenre {
        self.genre_musical
    }

    pub fn reseaux_sociaux(&self) -> Option<&SocialLinks> {
        self.reseaux_sociaux.as_ref()
    }

    pub fn newsletter_inscrit(&self) -> Option<bool> {
        self.newsletter_inscrit
    }

    pub fn statut(&self) -> Option<ClientStatus> {
        self.statut
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }
}

/// An outgoing email that passed the email schema.
///
/// ```compile_fail
/// use mdmc_crm::models::EmailDraft;
///
/// let draft = EmailDraft {
///     to: "nobody".to_string(),
///     subject: String::new(),
///     body: String::new(),
///     client_id: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub(crate) client_id: Option<String>,
}

impl EmailDraft {
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

/// A sales opportunity that passed the opportunity schema.
///
/// ```compile_fail
/// use mdmc_crm::models::Opportunity;
///
/// let opportunity = Opportunity {
///     client_id: String::new(),
///     titre: "x".to_string(),
///     description: None,
///     mots_cles_triggers: None,
///     email_source_id: None,
///     statut: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub(crate) client_id: String,
    pub(crate) titre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mots_cles_triggers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email_source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) statut: Option<OpportunityStatus>,
}

impl Opportunity {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn titre(&self) -> &str {
        &self.titre
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn mots_cles_triggers(&self) -> Option<&[String]> {
        self.mots_cles_triggers.as_deref()
    }

    pub fn email_source_id(&self) -> Option<&str> {
        self.email_source_id.as_deref()
    }

    pub fn statut(&self) -> Option<OpportunityStatus> {
        self.statut
    }
}

/// Authenticated user as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any additional profile fields
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// Snapshot delivered to auth subscribers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
}

/// `GET /auth/status`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// `GET /auth/google/url`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUrlResponse {
    /// Older backends answer with `url` instead of `authUrl`.
    #[serde(rename = "authUrl", alias = "url")]
    pub auth_url: String,
}

/// `POST /auth/google/callback`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// `GET /clients/stats/overview`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub inactive: u64,

    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// `GET /opportunities/stats/overview`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpportunityStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub won: u64,
    #[serde(default)]
    pub lost: u64,
    #[serde(default)]
    pub pending: u64,

    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}

/// Query parameters for `GET /clients`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statut: Option<ClientStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_musical: Option<MusicGenre>,
}

/// Query parameters for `GET /emails`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "clientId", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Query parameters for `GET /opportunities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpportunityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statut: Option<OpportunityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_music_genre_wire_names() {
        assert_eq!("électro".parse::<MusicGenre>(), Ok(MusicGenre::Electro));
        assert_eq!("r&b".parse::<MusicGenre>(), Ok(MusicGenre::RnB));
        assert!("metal".parse::<MusicGenre>().is_err());
        assert_eq!(MusicGenre::ALL.len(), 7);
    }

    #[test]
    fn test_status_round_trips_through_serde() {
        let status: OpportunityStatus = serde_json::from_value(json!("en_cours")).unwrap();
        assert_eq!(status, OpportunityStatus::EnCours);
        assert_eq!(serde_json::to_value(ClientStatus::AncienClient).unwrap(), json!("ancien_client"));
    }

    #[test]
    fn test_auth_url_accepts_both_keys() {
        let a: AuthUrlResponse = serde_json::from_value(json!({"authUrl": "https://a"})).unwrap();
        let b: AuthUrlResponse = serde_json::from_value(json!({"url": "https://b"})).unwrap();
        assert_eq!(a.auth_url, "https://a");
        assert_eq!(b.auth_url, "https://b");
    }

    #[test]
    fn test_auth_state_serializes_camel_case() {
        let state = AuthState {
            is_authenticated: true,
            user: None,
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"isAuthenticated": true, "user": null})
        );
    }

    #[test]
    fn test_health_status_parses_mock_backend_payload() {
        let health: HealthStatus = serde_json::from_value(json!({
            "status": "ok",
            "service": "mdmc-backend",
            "timestamp": "2024-05-01T10:00:00.000Z",
            "port": 5001,
            "version": "1.0.0"
        }))
        .unwrap();
        assert!(health.is_ok());
        assert!(health.timestamp.is_some());
    }
}
