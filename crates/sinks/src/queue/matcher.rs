//! Match allow-list
//!
//! Each rule is `metric_name` or `metric_name{label="value",...}`. Rules for
//! the same metric name are alternatives: a sample passes if any one of them
//! has all its pairs present and equal on the series. A bare name matches
//! every series of that name. An empty list matches everything.

use std::collections::HashMap;

use sroute_protocol::Series;

use crate::{Result, SinkError};

/// Required `(name, value)` pairs for one alternative
type Constraint = Vec<(String, String)>;

/// Compiled allow-list keyed by metric name
#[derive(Debug, Clone, Default)]
pub struct MatchRules {
    rules: HashMap<String, Vec<Constraint>>,
}

impl MatchRules {
    /// Parse every entry; any malformed entry fails the route build
    pub fn parse(route: &str, entries: &[String]) -> Result<Self> {
        let mut rules: HashMap<String, Vec<Constraint>> = HashMap::new();
        for entry in entries {
            let (name, constraint) = parse_entry(entry).map_err(|message| {
                SinkError::build("kafka", route, format!("invalid match rule {:?}: {}", entry, message))
            })?;
            rules.entry(name).or_default().push(constraint);
        }
        Ok(Self { rules })
    }

    /// Whether the list is empty (matches everything)
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct metric names
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether `series` is allowed through
    pub fn matches(&self, series: &Series) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        let Some(alternatives) = self.rules.get(series.metric_name()) else {
            return false;
        };
        alternatives.iter().any(|constraint| {
            constraint
                .iter()
                .all(|(name, value)| series.label(name) == Some(value.as_str()))
        })
    }
}

/// Split `name{a="1",b="2"}` into its name and pairs
fn parse_entry(entry: &str) -> std::result::Result<(String, Constraint), String> {
    let entry = entry.trim();
    let (name, body) = match entry.find('{') {
        Some(open) => {
            let Some(body) = entry[open + 1..].strip_suffix('}') else {
                return Err("missing closing '}'".into());
            };
            (entry[..open].trim(), Some(body))
        }
        None => (entry, None),
    };

    if name.is_empty() {
        return Err("empty metric name".into());
    }
    if name.contains(['}', '"', ',', '=']) {
        return Err(format!("unexpected character in metric name {:?}", name));
    }

    let constraint = match body {
        Some(body) => parse_pairs(body)?,
        None => Vec::new(),
    };
    Ok((name.to_string(), constraint))
}

/// Parse `a="1", b="2"` with `\"` and `\\` escapes inside values
fn parse_pairs(body: &str) -> std::result::Result<Constraint, String> {
    let mut pairs = Vec::new();
    let mut rest = body.trim_start();

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else {
            return Err(format!("expected '=' in {:?}", rest));
        };
        let label = rest[..eq].trim();
        if label.is_empty() {
            return Err("empty label name".into());
        }

        let after_eq = rest[eq + 1..].trim_start();
        let Some(quoted) = after_eq.strip_prefix('"') else {
            return Err(format!("value for {:?} must be quoted", label));
        };

        let mut value = String::new();
        let mut chars = quoted.char_indices();
        let mut closed_at = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => return Err("dangling escape".into()),
                },
                '"' => {
                    closed_at = Some(i);
                    break;
                }
                c => value.push(c),
            }
        }
        let Some(closed_at) = closed_at else {
            return Err(format!("unterminated value for {:?}", label));
        };
        pairs.push((label.to_string(), value));

        rest = quoted[closed_at + 1..].trim_start();
        if let Some(next) = rest.strip_prefix(',') {
            rest = next.trim_start();
        } else if !rest.is_empty() {
            return Err(format!("expected ',' before {:?}", rest));
        }
    }

    Ok(pairs)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
