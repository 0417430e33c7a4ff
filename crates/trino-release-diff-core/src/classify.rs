//! Heuristic attribution of change descriptions to connectors.
//!
//! Matching is driven by an ordered rule table, [`CONNECTOR_RULES`]. The
//! first rule whose keyword appears in the lower-cased text wins, so more
//! specific names must come before generic ones (`sqlserver` before `jdbc`).
//! When no rule matches, the word immediately before `" connector"` is used
//! as the name. Anything else falls into [`GENERAL`].

/// Catch-all connector name for changes that name no connector.
pub const GENERAL: &str = "General";

/// A keyword and the display name reported when it matches.
///
/// Without an explicit display name the keyword is title-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorRule {
    pub keyword: &'static str,
    pub display: Option<&'static str>,
}

impl ConnectorRule {
    const fn named(keyword: &'static str, display: &'static str) -> Self {
        Self {
            keyword,
            display: Some(display),
        }
    }

    const fn plain(keyword: &'static str) -> Self {
        Self {
            keyword,
            display: None,
        }
    }

    /// Matches against the lower-cased text, or against the text with all
    /// whitespace removed (so `sql server` matches `sqlserver`).
    fn matches(&self, lower: &str, compact: &str) -> bool {
        if lower.contains(self.keyword) {
            return true;
        }
        let keyword: String = self.keyword.split_whitespace().collect();
        compact.contains(&keyword)
    }

    fn display_name(&self) -> String {
        match self.display {
            Some(name) => name.to_string(),
            None => title_case(self.keyword),
        }
    }
}

/// Known Trino connectors, in match-priority order.
pub const CONNECTOR_RULES: &[ConnectorRule] = &[
    ConnectorRule::named("bigquery", "BigQuery"),
    ConnectorRule::named("clickhouse", "ClickHouse"),
    ConnectorRule::named("delta lake", "Delta Lake"),
    ConnectorRule::named("elasticsearch", "Elasticsearch"),
    ConnectorRule::plain("hive"),
    ConnectorRule::plain("iceberg"),
    ConnectorRule::named("sqlserver", "SQL Server"),
    ConnectorRule::named("mongodb", "MongoDB"),
    ConnectorRule::named("mysql", "MySQL"),
    ConnectorRule::named("mariadb", "MariaDB"),
    ConnectorRule::plain("oracle"),
    ConnectorRule::named("postgresql", "PostgreSQL"),
    ConnectorRule::plain("redshift"),
    ConnectorRule::plain("redis"),
    ConnectorRule::plain("snowflake"),
    ConnectorRule::plain("phoenix"),
    ConnectorRule::plain("pinot"),
    ConnectorRule::plain("cassandra"),
    ConnectorRule::plain("accumulo"),
    ConnectorRule::plain("druid"),
    ConnectorRule::plain("kudu"),
    ConnectorRule::plain("kafka"),
    ConnectorRule::plain("thrift"),
    ConnectorRule::plain("memory"),
    ConnectorRule::named("jdbc", "JDBC"),
];

/// Attributes a change description to a connector using [`CONNECTOR_RULES`].
pub fn identify_connector(text: &str) -> String {
    identify_with(CONNECTOR_RULES, text)
}

/// Attributes a change description to a connector using a custom rule table.
pub fn identify_with(rules: &[ConnectorRule], text: &str) -> String {
    let lower = text.to_lowercase();
    let compact: String = lower.split_whitespace().collect();

    if let Some(rule) = rules.iter().find(|rule| rule.matches(&lower, &compact)) {
        return rule.display_name();
    }

    if let Some(name) = word_before_connector(&lower) {
        return name;
    }

    GENERAL.to_string()
}

/// `"... the exasol connector ..."` → `Exasol`.
fn word_before_connector(lower: &str) -> Option<String> {
    let idx = lower.find(" connector")?;
    let word = lower[..idx].split_whitespace().last()?;
    if word.chars().count() > 2 && word.chars().all(char::is_alphabetic) {
        Some(capitalize(word))
    } else {
        None
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_connector_with_override() {
        assert_eq!(
            identify_connector("The BigQuery connector now supports X"),
            "BigQuery"
        );
    }

    #[test]
    fn test_sql_server_beats_jdbc() {
        assert_eq!(
            identify_connector("Improved SQL Server JDBC driver"),
            "SQL Server"
        );
    }

    #[test]
    fn test_no_connector_is_general() {
        assert_eq!(identify_connector("Improved query planner"), GENERAL);
    }

    #[test]
    fn test_default_title_case() {
        assert_eq!(identify_connector("Removed the Accumulo connector"), "Accumulo");
        assert_eq!(identify_connector("Fix reading ICEBERG tables"), "Iceberg");
    }

    #[test]
    fn test_multi_word_keyword_without_space() {
        assert_eq!(identify_connector("Fix deltalake checkpoints"), "Delta Lake");
        assert_eq!(identify_connector("Fix Delta Lake checkpoints"), "Delta Lake");
    }

    #[test]
    fn test_first_rule_wins() {
        assert_eq!(
            identify_connector("Copy Hive tables into Iceberg"),
            "Hive"
        );
    }

    #[test]
    fn test_word_before_connector() {
        assert_eq!(
            identify_connector("Add support for the Exasol connector."),
            "Exasol"
        );
    }

    #[test]
    fn test_word_before_connector_must_be_alphabetic() {
        assert_eq!(identify_connector("Deprecate the v2 connector"), GENERAL);
        assert_eq!(identify_connector("An x connector fix"), GENERAL);
    }

    #[test]
    fn test_custom_rules() {
        let rules = [ConnectorRule::named("exasol", "EXASOL")];
        assert_eq!(identify_with(&rules, "exasol fix"), "EXASOL");
        assert_eq!(identify_with(&rules, "The BigQuery thing"), GENERAL);
    }
}
