//! Database backend identification
//!
//! Store configs name their backend through a `dialect` or the scheme of a
//! connection URI; both resolve to a [`DatabaseBackendType`].

/// Database backend type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackendType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseBackendType {
    /// Resolve a backend from a URI scheme such as `postgres://`
    pub fn from_uri(uri: &str) -> Result<Self, String> {
        let scheme = uri
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .or_else(|| uri.split_once(':').map(|(scheme, _)| scheme))
            .ok_or_else(|| format!("Connection URI '{}' has no scheme", uri))?;
        scheme.parse()
    }
}

impl std::fmt::Display for DatabaseBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackendType::PostgreSQL => write!(f, "postgresql"),
            DatabaseBackendType::MySQL => write!(f, "mysql"),
            DatabaseBackendType::SQLite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for DatabaseBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseBackendType::PostgreSQL),
            "mysql" | "mariadb" => Ok(DatabaseBackendType::MySQL),
            "sqlite" => Ok(DatabaseBackendType::SQLite),
            _ => Err(format!("Unsupported database backend: {}", s)),
        }
    }
}
