//! Parser for ClickHouse legacy engine descriptors.
//!
//! `system.tables.engine_full` encodes old-style MergeTree tables as a single call:
//!
//! ```text
//! MergeTree(EventDate, (CounterID, EventDate), 8192)
//! MergeTree(EventDate, intHash32(UserID), (CounterID, EventDate, intHash32(UserID)), 8192)
//! ReplicatedMergeTree('/clickhouse/tables/{shard}/hits', '{replica}', EventDate, (CounterID, EventDate), 8192)
//! ```
//!
//! Parameters are split on top-level commas only, so function calls and tuples inside
//! the partitioning or key expressions stay intact.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an engine descriptor could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineParseError {
    #[error("open bracket not found")]
    MissingOpenParen,

    #[error("partitioning key not found")]
    MissingPartitioningKey,

    #[error("granularity key not found")]
    MissingGranularity,

    #[error("parsing granularity failed: `{0}` is not an integer")]
    InvalidGranularity(String),
}

/// Structured form of an engine descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Engine name, e.g. `MergeTree` or `ReplicatedSummingMergeTree`
    pub name: String,
    /// Partitioning (date column) expression
    pub partitioning_key: String,
    /// Optional sampling expression
    pub sampling_key: Option<String>,
    /// Primary key column expressions, in key order
    pub primary_key: Vec<String>,
    /// Index granularity
    pub granularity: i64,
}

impl std::str::FromStr for EngineDescriptor {
    type Err = EngineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_engine(s)
    }
}

/// Parse an `engine_full` string into an [`EngineDescriptor`].
pub fn parse_engine(input: &str) -> Result<EngineDescriptor, EngineParseError> {
    let open = input.find('(').ok_or(EngineParseError::MissingOpenParen)?;
    let name = input[..open].trim().to_string();

    let rest = input[open + 1..].trim_end();
    let body = rest.strip_suffix(')').unwrap_or(rest).trim();
    let mut fields = split_top_level(body);

    // Replicated engines prepend the ZooKeeper path and replica name.
    if name.starts_with("Replicated") && fields.len() >= 5 {
        fields.drain(..2);
    }

    if fields.len() < 2 {
        return Err(EngineParseError::MissingPartitioningKey);
    }
    if fields.len() < 3 {
        return Err(EngineParseError::MissingGranularity);
    }

    let granularity_field = fields[fields.len() - 1];
    let granularity = granularity_field
        .parse::<i64>()
        .map_err(|_| EngineParseError::InvalidGranularity(granularity_field.to_string()))?;

    let partitioning_key = fields[0].to_string();
    let middle = &fields[1..fields.len() - 1];

    // A sampling expression is only recognised in front of a parenthesized key;
    // otherwise every middle field is a key column, as in `MergeTree(d, a, b, 8192)`.
    let (sampling_key, key_fields) = match middle {
        [sampling, primary] if is_key_tuple(primary) => (Some(sampling.to_string()), &middle[1..]),
        _ => (None, middle),
    };

    Ok(EngineDescriptor {
        name,
        partitioning_key,
        sampling_key,
        primary_key: key_fields.iter().flat_map(|field| split_key_columns(field)).collect(),
        granularity,
    })
}

fn is_key_tuple(expr: &str) -> bool {
    strip_enclosing_parens(expr)
        .or_else(|| expr.strip_prefix("tuple").and_then(strip_enclosing_parens))
        .is_some()
}

/// Expand a primary-key expression into its column expressions.
///
/// `(a, b)` and `tuple(a, b)` yield both members; a bare expression yields itself.
fn split_key_columns(expr: &str) -> Vec<String> {
    let inner = strip_enclosing_parens(expr)
        .or_else(|| expr.strip_prefix("tuple").and_then(strip_enclosing_parens))
        .unwrap_or(expr);

    split_top_level(inner)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Return the inside of `(...)` when the outer parentheses wrap the whole expression.
fn strip_enclosing_parens(expr: &str) -> Option<&str> {
    let inner = expr.strip_prefix('(')?.strip_suffix(')')?;

    // `(a) + (b)` starts and ends with parens that do not match each other.
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(inner)
}

/// Split on commas that sit outside brackets and single-quoted literals.
///
/// Fields are trimmed; empty fields are dropped.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '\'' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '\'' => in_string = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                fields.push(input[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(input[start..].trim());

    fields.retain(|f| !f.is_empty());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_merge_tree() {
        let engine = parse_engine("MergeTree(EventDate, (CounterID, EventDate), 8192)").unwrap();

        assert_eq!(engine.name, "MergeTree");
        assert_eq!(engine.partitioning_key, "EventDate");
        assert_eq!(engine.sampling_key, None);
        assert_eq!(engine.primary_key, vec!["CounterID", "EventDate"]);
        assert_eq!(engine.granularity, 8192);
    }

    #[test]
    fn test_parse_single_column_key() {
        let engine = parse_engine("MergeTree(d, id, 8192)").unwrap();
        assert_eq!(engine.primary_key, vec!["id"]);
    }

    #[test]
    fn test_parse_sampling_key() {
        let engine = parse_engine(
            "MergeTree(EventDate, intHash32(UserID), (CounterID, EventDate, intHash32(UserID)), 8192)",
        )
        .unwrap();

        assert_eq!(engine.sampling_key.as_deref(), Some("intHash32(UserID)"));
        assert_eq!(
            engine.primary_key,
            vec!["CounterID", "EventDate", "intHash32(UserID)"]
        );
    }

    #[test]
    fn test_nested_commas_stay_inside_expressions() {
        let engine =
            parse_engine("MergeTree(toStartOfInterval(ts, INTERVAL 1 day), (a, cityHash64(b, c)), 1024)")
                .unwrap();

        assert_eq!(engine.partitioning_key, "toStartOfInterval(ts, INTERVAL 1 day)");
        assert_eq!(engine.primary_key, vec!["a", "cityHash64(b, c)"]);
        assert_eq!(engine.granularity, 1024);
    }

    #[test]
    fn test_replicated_engine_skips_replication_args() {
        let engine = parse_engine(
            "ReplicatedMergeTree('/clickhouse/tables/{shard}/hits', '{replica}', EventDate, (CounterID, EventDate), 8192)",
        )
        .unwrap();

        assert_eq!(engine.name, "ReplicatedMergeTree");
        assert_eq!(engine.partitioning_key, "EventDate");
        assert_eq!(engine.primary_key, vec!["CounterID", "EventDate"]);
    }

    #[test]
    fn test_quoted_commas_are_not_separators() {
        let fields = split_top_level("'a,b', c");
        assert_eq!(fields, vec!["'a,b'", "c"]);
    }

    #[test]
    fn test_tuple_key() {
        let engine = parse_engine("MergeTree(d, tuple(a, b), 8192)").unwrap();
        assert_eq!(engine.primary_key, vec!["a", "b"]);
    }

    #[test]
    fn test_non_enclosing_parens_are_kept() {
        assert_eq!(split_key_columns("(a) + (b)"), vec!["(a) + (b)"]);
    }

    #[test]
    fn test_missing_open_paren() {
        assert_eq!(
            parse_engine("Memory"),
            Err(EngineParseError::MissingOpenParen)
        );
    }

    #[test]
    fn test_missing_comma() {
        assert_eq!(
            parse_engine("Log(EventDate)"),
            Err(EngineParseError::MissingPartitioningKey)
        );
    }

    #[test]
    fn test_missing_granularity() {
        assert_eq!(
            parse_engine("MergeTree(EventDate, 8192)"),
            Err(EngineParseError::MissingGranularity)
        );
    }

    #[test]
    fn test_non_numeric_granularity() {
        assert_eq!(
            parse_engine("MergeTree(EventDate, (CounterID, EventDate), abc)"),
            Err(EngineParseError::InvalidGranularity("abc".to_string()))
        );
    }

    #[test]
    fn test_unparenthesized_key_columns() {
        let engine = parse_engine("MergeTree(d, a, b, 8192)").unwrap();
        assert_eq!(engine.sampling_key, None);
        assert_eq!(engine.primary_key, vec!["a", "b"]);

        let engine = parse_engine("MergeTree(d, a, b, c, 8192)").unwrap();
        assert_eq!(engine.sampling_key, None);
        assert_eq!(engine.primary_key, vec!["a", "b", "c"]);
        assert_eq!(engine.granularity, 8192);
    }

    #[test]
    fn test_sampling_key_before_tuple_key() {
        let engine = parse_engine("MergeTree(d, sipHash64(id), tuple(id, ts), 8192)").unwrap();
        assert_eq!(engine.sampling_key.as_deref(), Some("sipHash64(id)"));
        assert_eq!(engine.primary_key, vec!["id", "ts"]);
    }

    #[test]
    fn test_signed_granularity() {
        let engine = parse_engine("MergeTree(d, id, -1)").unwrap();
        assert_eq!(engine.granularity, -1);
    }

    #[test]
    fn test_modern_engine_syntax_is_rejected() {
        assert_eq!(
            parse_engine("MergeTree PARTITION BY toYYYYMM(d) ORDER BY (a, b) SETTINGS index_granularity = 8192"),
            Err(EngineParseError::MissingPartitioningKey)
        );
        assert_eq!(
            parse_engine("MergeTree ORDER BY id SETTINGS index_granularity = 8192"),
            Err(EngineParseError::MissingOpenParen)
        );
    }

    #[test]
    fn test_from_str() {
        let engine: EngineDescriptor = "SummingMergeTree(d, (a, b), 256)".parse().unwrap();
        assert_eq!(engine.name, "SummingMergeTree");
        assert_eq!(engine.granularity, 256);
    }
}
