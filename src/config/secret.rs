//! Credential handling for the database connection string
//!
//! The connection string embeds the database password, so it is held in a
//! `secrecy::Secret` that zeroes its memory on drop and redacts `Debug`.
//! Serializing the configuration writes the redacted form.
//!
//! ```rust
//! use nmdose::config::secret_connection_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_connection_string("postgresql://nmdose:pw@localhost/nmdose");
//! assert!(dsn.expose_secret().has_postgres_scheme());
//! assert!(!format!("{dsn:?}").contains("pw@"));
//! assert_eq!(dsn.expose_secret().redacted_url(), "postgresql://***@localhost/nmdose");
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Serialize, Serializer};
use zeroize::Zeroize;

/// Schemes accepted by the PostgreSQL driver
const POSTGRES_SCHEMES: [&str; 2] = ["postgresql", "postgres"];

/// A PostgreSQL connection URL, possibly carrying a password
#[derive(Clone, Debug, Deserialize, Zeroize)]
#[serde(transparent)]
#[zeroize(drop)]
pub struct ConnectionString(String);

impl CloneableSecret for ConnectionString {}
impl DebugSecret for ConnectionString {}
impl SerializableSecret for ConnectionString {}

impl ConnectionString {
    /// Full URL including credentials
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// URL scheme, e.g. `postgresql`
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Whether the scheme is `postgresql://` or `postgres://`
    pub fn has_postgres_scheme(&self) -> bool {
        self.scheme()
            .is_some_and(|scheme| POSTGRES_SCHEMES.contains(&scheme))
    }

    /// The URL with any user info replaced by `***`
    pub fn redacted_url(&self) -> String {
        match (self.scheme(), self.0.rsplit_once('@')) {
            (Some(scheme), Some((_, host_part))) => format!("{scheme}://***@{host_part}"),
            _ => self.0.clone(),
        }
    }
}

impl From<String> for ConnectionString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for ConnectionString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.redacted_url())
    }
}

/// Connection string wrapped in [`Secret`]
pub type SecretConnectionString = Secret<ConnectionString>;

/// Wrap a connection URL
pub fn secret_connection_string(value: impl Into<String>) -> SecretConnectionString {
    Secret::new(ConnectionString::from(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_scheme_detection() {
        let dsn = ConnectionString::from("postgres://db.local/nmdose".to_string());
        assert_eq!(dsn.scheme(), Some("postgres"));
        assert!(dsn.has_postgres_scheme());

        let other = ConnectionString::from("mysql://db.local/nmdose".to_string());
        assert!(!other.has_postgres_scheme());

        let bare = ConnectionString::from("host=db.local dbname=nmdose".to_string());
        assert_eq!(bare.scheme(), None);
        assert!(!bare.has_postgres_scheme());
    }

    #[test]
    fn test_redacted_url() {
        let dsn = ConnectionString::from("postgresql://nmdose:pw@db.local:5432/nmdose".to_string());
        assert_eq!(dsn.redacted_url(), "postgresql://***@db.local:5432/nmdose");

        let no_user = ConnectionString::from("postgresql://db.local/nmdose".to_string());
        assert_eq!(no_user.redacted_url(), "postgresql://db.local/nmdose");
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let secret = secret_connection_string("postgresql://nmdose:hunter2@db/nmdose");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn test_serialize_writes_redacted_form() {
        #[derive(Serialize, Deserialize)]
        struct Section {
            connection_string: SecretConnectionString,
        }

        let parsed: Section =
            toml::from_str(r#"connection_string = "postgresql://nmdose:hunter2@db/nmdose""#)
                .unwrap();
        assert_eq!(
            parsed.connection_string.expose_secret().as_str(),
            "postgresql://nmdose:hunter2@db/nmdose"
        );

        let written = toml::to_string(&parsed).unwrap();
        assert!(!written.contains("hunter2"));
        assert!(written.contains("postgresql://***@db/nmdose"));
    }
}
