//! Topic templates
//!
//! The topic for each series is rendered from a minijinja template whose
//! context is the series' label map, e.g. `metrics-{{ job }}`. Two helpers
//! are available:
//!
//! - `replace(old, new, s)`: replace every `old` in `s` with `new`
//! - `substring(start, end, s)`: characters `start..end` of `s`; a negative
//!   `start` clamps to 0 and a negative or out-of-range `end` clamps to the
//!   length. `start >= end` is an error.

use std::collections::BTreeMap;

use minijinja::{Environment, Error as TemplateError, ErrorKind};

use crate::{Result, SinkError};

const TEMPLATE_NAME: &str = "topic";

/// Compiled topic template
#[derive(Debug)]
pub struct TopicTemplate {
    source: String,
    env: Environment<'static>,
}

impl TopicTemplate {
    /// Compile `source`; syntax errors fail the route build
    pub fn compile(route: &str, source: &str) -> Result<Self> {
        let mut env = Environment::new();
        env.add_function("replace", replace);
        env.add_function("substring", substring);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())
            .map_err(|e| SinkError::build("kafka", route, format!("invalid topic template: {}", e)))?;
        Ok(Self {
            source: source.to_string(),
            env,
        })
    }

    /// Template source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the topic for one label set
    ///
    /// Missing labels render as empty strings.
    pub fn render(&self, labels: &BTreeMap<String, String>) -> std::result::Result<String, TemplateError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        template.render(labels)
    }
}

fn replace(old: &str, new: &str, src: &str) -> String {
    src.replace(old, new)
}

fn substring(start: i64, end: i64, s: &str) -> std::result::Result<String, TemplateError> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let start = start.max(0);
    let end = if end < 0 || end > len { len } else { end };
    if start >= end {
        return Err(TemplateError::new(
            ErrorKind::InvalidOperation,
            format!("substring start {} must be less than end {}", start, end),
        ));
    }
    Ok(chars[start as usize..end as usize].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_topic() {
        let t = TopicTemplate::compile("r", "metrics").unwrap();
        assert_eq!(t.render(&labels(&[])).unwrap(), "metrics");
        assert_eq!(t.source(), "metrics");
    }

    #[test]
    fn test_label_interpolation() {
        let t = TopicTemplate::compile("r", "metrics-{{ job }}").unwrap();
        assert_eq!(t.render(&labels(&[("job", "node")])).unwrap(), "metrics-node");
    }

    #[test]
    fn test_missing_label_renders_empty() {
        let t = TopicTemplate::compile("r", "{{ job }}").unwrap();
        assert_eq!(t.render(&labels(&[("instance", "x")])).unwrap(), "");
    }

    #[test]
    fn test_replace_helper() {
        let t = TopicTemplate::compile("r", r#"m-{{ replace(".", "_", instance) }}"#).unwrap();
        assert_eq!(
            t.render(&labels(&[("instance", "10.0.0.1")])).unwrap(),
            "m-10_0_0_1"
        );
    }

    #[test]
    fn test_substring_helper() {
        let t = TopicTemplate::compile("r", "{{ substring(0, 3, job) }}").unwrap();
        assert_eq!(t.render(&labels(&[("job", "kubernetes")])).unwrap(), "kub");
    }

    #[test]
    fn test_substring_clamps() {
        assert_eq!(substring(-5, 2, "abcdef").unwrap(), "ab");
        assert_eq!(substring(2, -1, "abcdef").unwrap(), "cdef");
        assert_eq!(substring(2, 100, "abcdef").unwrap(), "cdef");
    }

    #[test]
    fn test_substring_start_past_end_is_error() {
        assert!(substring(3, 3, "abcdef").is_err());
        assert!(substring(0, -1, "").is_err());

        let t = TopicTemplate::compile("r", "{{ substring(5, 2, job) }}").unwrap();
        assert!(t.render(&labels(&[("job", "kubernetes")])).is_err());
    }

    #[test]
    fn test_syntax_error_fails_build() {
        let err = TopicTemplate::compile("r", "metrics-{{ job").unwrap_err();
        assert!(matches!(err, SinkError::Build { kind: "kafka", .. }));
    }
}
