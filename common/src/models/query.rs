//! SQL generation models.
//!
//! Contains the request/response pair for the generate operation. Both types
//! live for a single request/response cycle and are never persisted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Target database label for the generated SQL.
///
/// Passed through to the prompt as a plain label; no dialect-specific
/// validation happens anywhere.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum DatabaseType {
    /// PostgreSQL (default).
    #[default]
    PostgreSQL,
    /// MySQL.
    MySQL,
    /// Google BigQuery.
    BigQuery,
    /// Amazon Redshift.
    Redshift,
    /// Snowflake.
    Snowflake,
    /// SQLite.
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::BigQuery => "BigQuery",
            DatabaseType::Redshift => "Redshift",
            DatabaseType::Snowflake => "Snowflake",
            DatabaseType::SQLite => "SQLite",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSQL),
            "mysql" => Ok(DatabaseType::MySQL),
            "bigquery" => Ok(DatabaseType::BigQuery),
            "redshift" => Ok(DatabaseType::Redshift),
            "snowflake" => Ok(DatabaseType::Snowflake),
            "sqlite" => Ok(DatabaseType::SQLite),
            _ => Err(format!("unknown database type: {}", s)),
        }
    }
}

/// Request body for generating a SQL query.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct QueryRequest {
    /// Natural language question to convert into SQL.
    #[validate(length(min = 1, message = "Question is required"))]
    pub question: String,

    /// Optional database schema text, interpolated into the prompt verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Target database label (default: PostgreSQL).
    #[serde(default)]
    pub database_type: DatabaseType,
}

/// Result of a SQL generation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    /// Generated SQL, whitespace- and fence-stripped.
    pub sql_query: String,

    /// Echo of the input question (trimmed).
    pub question: String,

    /// Echo of the target database label.
    pub database_type: DatabaseType,

    /// Whether generation succeeded.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_default_is_postgresql() {
        assert_eq!(DatabaseType::default(), DatabaseType::PostgreSQL);
    }

    #[test]
    fn test_database_type_serializes_as_label() {
        let json = serde_json::to_string(&DatabaseType::BigQuery).unwrap();
        assert_eq!(json, "\"BigQuery\"");
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!("postgres".parse::<DatabaseType>().unwrap(), DatabaseType::PostgreSQL);
        assert_eq!("Snowflake".parse::<DatabaseType>().unwrap(), DatabaseType::Snowflake);
        assert!("oracle".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"question": "total sales by region"}"#).unwrap();
        assert_eq!(req.database_type, DatabaseType::PostgreSQL);
        assert!(req.schema.is_none());
    }
}
