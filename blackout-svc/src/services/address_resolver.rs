//! Fuzzy address search and district listing
//!
//! Matching is token based: the query is split on whitespace and every token
//! must be a case-insensitive substring of the street name or of the building
//! number. There is no ranking. Short tokens match broadly (`"1"` matches
//! `"118А"`); that is accepted rather than filtered.
//!
//! Case folding happens in Rust because SQLite `LIKE`/`lower()` only fold
//! ASCII, and street names are Cyrillic.

use blackout_common::models::{AddressCandidate, District};
use blackout_common::Result;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Parsed search text: lower-cased whitespace tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressQuery {
    tokens: Vec<String>,
}

impl AddressQuery {
    pub fn parse(text: Option<&str>) -> Self {
        let tokens = text
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        Self { tokens }
    }

    /// No tokens: the query selects the whole corpus
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// AND across tokens, OR across the two fields within a token
    pub fn matches(&self, street: &str, number: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }

        let street = street.to_lowercase();
        let number = number.to_lowercase();
        self.tokens
            .iter()
            .all(|token| street.contains(token.as_str()) || number.contains(token.as_str()))
    }
}

/// Searches the street/building corpus
#[derive(Clone)]
pub struct AddressResolver {
    db: SqlitePool,
}

impl AddressResolver {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Buildings whose street/number satisfy every token of `text`
    ///
    /// Absent or blank text returns the full corpus, unpaginated. Results are
    /// ordered by street name, number, then id.
    pub async fn search(&self, text: Option<&str>) -> Result<Vec<AddressCandidate>> {
        let query = AddressQuery::parse(text);

        let rows = sqlx::query(
            r#"
            SELECT b.id AS building_id,
                   COALESCE(b.number, '') AS building,
                   COALESCE(s.name, '') AS street
            FROM buildings b
            JOIN streets s ON s.id = b.street_id
            ORDER BY s.name, b.number, b.id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut candidates = Vec::new();
        for row in &rows {
            let street: String = row.try_get("street")?;
            let building: String = row.try_get("building")?;
            if query.matches(&street, &building) {
                candidates.push(AddressCandidate {
                    street,
                    building,
                    building_id: row.try_get("building_id")?,
                });
            }
        }

        debug!(
            tokens = ?query.tokens,
            scanned = rows.len(),
            matched = candidates.len(),
            "Address search"
        );
        Ok(candidates)
    }

    /// Distinct names across official, folk and big-folk districts, sorted
    pub async fn districts(&self) -> Result<Vec<District>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM districts WHERE name IS NOT NULL
            UNION
            SELECT name FROM folk_districts WHERE name IS NOT NULL
            UNION
            SELECT name FROM big_folk_districts WHERE name IS NOT NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(names.into_iter().map(|name| District { name }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_has_no_tokens() {
        assert!(AddressQuery::parse(None).is_empty());
        assert!(AddressQuery::parse(Some("")).is_empty());
        assert!(AddressQuery::parse(Some("   \t ")).is_empty());
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(AddressQuery::parse(None).matches("Светланская ул.", "118А"));
    }

    #[test]
    fn test_street_token_and_number_substring() {
        let query = AddressQuery::parse(Some("светланская 1"));
        assert!(query.matches("Светланская ул.", "118А"));
    }

    #[test]
    fn test_every_token_must_match() {
        let query = AddressQuery::parse(Some("светланская 9"));
        assert!(!query.matches("Светланская ул.", "118А"));
    }

    #[test]
    fn test_token_may_match_either_field() {
        let query = AddressQuery::parse(Some("118а"));
        assert!(query.matches("Светланская ул.", "118А"));

        let query = AddressQuery::parse(Some("СВЕТЛАН"));
        assert!(query.matches("Светланская ул.", "118А"));
    }

    #[test]
    fn test_single_character_matches_broadly() {
        let query = AddressQuery::parse(Some("1"));
        assert!(query.matches("Алеутская ул.", "118А"));
        assert!(query.matches("Алеутская ул.", "21"));
        assert!(!query.matches("Алеутская ул.", "25"));
    }

    #[test]
    fn test_tokens_split_on_any_whitespace() {
        let query = AddressQuery::parse(Some("  алеутская\t25 "));
        assert_eq!(query.tokens, vec!["алеутская".to_string(), "25".to_string()]);
    }
}
