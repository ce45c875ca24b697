//! RelabelRule - one compiled relabel step
//!
//! Follows the Prometheus relabeling model. Source label values are joined
//! with the separator and matched against a fully anchored regex. Setting a
//! label to the empty string removes it.

use std::collections::BTreeMap;

use md5::{Digest, Md5};
use regex::Regex;
use sroute_config::{RelabelAction, RelabelRuleConfig};

use crate::error::{TransformError, TransformResult};

#[cfg(test)]
#[path = "rule_test.rs"]
mod tests;

/// Working label set: name -> value, sorted by name
pub type LabelSet = BTreeMap<String, String>;

/// Compiled relabel rule
#[derive(Debug, Clone)]
pub struct RelabelRule {
    source_labels: Vec<String>,
    separator: String,
    regex: Regex,
    modulus: u64,
    target_label: String,
    replacement: String,
    action: RelabelAction,
}

impl RelabelRule {
    /// Compile a rule, checking fields against its action
    ///
    /// `index` is the position in the chain, used only in errors.
    pub fn compile(index: usize, config: &RelabelRuleConfig) -> TransformResult<Self> {
        check_fields(index, config)?;

        let anchored = format!("^(?s:{})$", config.regex);
        let regex =
            Regex::new(&anchored).map_err(|e| TransformError::regex(index, &config.regex, e))?;

        Ok(Self {
            source_labels: config.source_labels.clone(),
            separator: config.separator.clone(),
            regex,
            modulus: config.modulus,
            target_label: config.target_label.clone(),
            replacement: config.replacement.clone(),
            action: config.action,
        })
    }

    /// The rule's action
    #[inline]
    pub fn action(&self) -> RelabelAction {
        self.action
    }

    /// Apply the rule to `labels` in place
    ///
    /// Returns `false` when the series must be dropped.
    pub fn apply(&self, labels: &mut LabelSet) -> bool {
        let value = self.joined_source(labels);

        match self.action {
            RelabelAction::Drop => {
                if self.regex.is_match(&value) {
                    return false;
                }
            }
            RelabelAction::Keep => {
                if !self.regex.is_match(&value) {
                    return false;
                }
            }
            RelabelAction::DropEqual => {
                if lookup(labels, &self.target_label) == value {
                    return false;
                }
            }
            RelabelAction::KeepEqual => {
                if lookup(labels, &self.target_label) != value {
                    return false;
                }
            }
            RelabelAction::Replace => self.replace(labels, &value),
            RelabelAction::Lowercase => {
                set_label(labels, self.target_label.clone(), value.to_lowercase());
            }
            RelabelAction::Uppercase => {
                set_label(labels, self.target_label.clone(), value.to_uppercase());
            }
            RelabelAction::HashMod => {
                let bucket = md5_tail(&value) % self.modulus;
                set_label(labels, self.target_label.clone(), bucket.to_string());
            }
            RelabelAction::LabelMap => {
                let mapped: Vec<(String, String)> = labels
                    .iter()
                    .filter(|(name, _)| self.regex.is_match(name))
                    .map(|(name, value)| {
                        let renamed = self.regex.replace_all(name, self.replacement.as_str());
                        (renamed.into_owned(), value.clone())
                    })
                    .collect();
                for (name, value) in mapped {
                    set_label(labels, name, value);
                }
            }
            RelabelAction::LabelDrop => labels.retain(|name, _| !self.regex.is_match(name)),
            RelabelAction::LabelKeep => labels.retain(|name, _| self.regex.is_match(name)),
        }

        true
    }

    fn joined_source(&self, labels: &LabelSet) -> String {
        let values: Vec<&str> = self
            .source_labels
            .iter()
            .map(|name| lookup(labels, name))
            .collect();
        values.join(&self.separator)
    }

    fn replace(&self, labels: &mut LabelSet, value: &str) {
        let Some(caps) = self.regex.captures(value) else {
            return;
        };

        let mut target = String::new();
        caps.expand(&self.target_label, &mut target);
        if !is_valid_label_name(&target) {
            return;
        }

        let mut result = String::new();
        caps.expand(&self.replacement, &mut result);
        set_label(labels, target, result);
    }
}

/// Missing labels read as the empty string
fn lookup<'a>(labels: &'a LabelSet, name: &str) -> &'a str {
    labels.get(name).map(String::as_str).unwrap_or("")
}

fn set_label(labels: &mut LabelSet, name: String, value: String) {
    if value.is_empty() {
        labels.remove(&name);
    } else {
        labels.insert(name, value);
    }
}

/// Last 8 bytes of the md5 digest, big-endian
fn md5_tail(value: &str) -> u64 {
    let digest = Md5::digest(value.as_bytes());
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&digest[8..16]);
    u64::from_be_bytes(tail)
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Label name that may reference capture groups as `$1`, `$name` or `${name}`
fn is_valid_target_template(target: &str) -> bool {
    let bytes = target.as_bytes();
    let word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' => {
                i += 1;
                if bytes.get(i) == Some(&b'{') {
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len() && word(bytes[end]) {
                        end += 1;
                    }
                    if end == start || bytes.get(end) != Some(&b'}') {
                        return false;
                    }
                    i = end + 1;
                } else {
                    let start = i;
                    while i < bytes.len() && word(bytes[i]) {
                        i += 1;
                    }
                    if i == start {
                        return false;
                    }
                }
            }
            b if i == 0 && b.is_ascii_digit() => return false,
            b if word(b) => i += 1,
            _ => return false,
        }
    }
    !bytes.is_empty()
}

fn check_fields(index: usize, config: &RelabelRuleConfig) -> TransformResult<()> {
    let defaults = RelabelRuleConfig::default();
    let action = config.action.as_str();

    let needs_target = matches!(
        config.action,
        RelabelAction::Replace
            | RelabelAction::HashMod
            | RelabelAction::Lowercase
            | RelabelAction::Uppercase
            | RelabelAction::KeepEqual
            | RelabelAction::DropEqual
    );
    if needs_target && config.target_label.is_empty() {
        return Err(TransformError::rule(index, action, "requires 'target_label'"));
    }

    match config.action {
        RelabelAction::Replace => {
            if !is_valid_target_template(&config.target_label) {
                return Err(TransformError::rule(
                    index,
                    action,
                    format!("'{}' is not a valid target label", config.target_label),
                ));
            }
        }
        RelabelAction::HashMod
        | RelabelAction::Lowercase
        | RelabelAction::Uppercase
        | RelabelAction::KeepEqual
        | RelabelAction::DropEqual => {
            if !is_valid_label_name(&config.target_label) {
                return Err(TransformError::rule(
                    index,
                    action,
                    format!("'{}' is not a valid label name", config.target_label),
                ));
            }
        }
        _ => {}
    }

    if config.action == RelabelAction::HashMod && config.modulus == 0 {
        return Err(TransformError::rule(
            index,
            action,
            "modulus must be greater than zero",
        ));
    }

    if matches!(
        config.action,
        RelabelAction::LabelDrop | RelabelAction::LabelKeep
    ) && (!config.source_labels.is_empty()
        || !config.target_label.is_empty()
        || config.modulus != defaults.modulus
        || config.separator != defaults.separator
        || config.replacement != defaults.replacement)
    {
        return Err(TransformError::rule(
            index,
            action,
            "only 'regex' may be set",
        ));
    }

    if matches!(
        config.action,
        RelabelAction::KeepEqual | RelabelAction::DropEqual
    ) && (config.regex != defaults.regex
        || config.modulus != defaults.modulus
        || config.separator != defaults.separator
        || config.replacement != defaults.replacement)
    {
        return Err(TransformError::rule(
            index,
            action,
            "'regex', 'modulus', 'separator' and 'replacement' must be left unset",
        ));
    }

    Ok(())
}
