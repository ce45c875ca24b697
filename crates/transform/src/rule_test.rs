//! Tests for RelabelRule
//!
//! Tests cover each action, regex anchoring, capture expansion, and
//! compile-time field checks.

use super::*;

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

fn rule(config: RelabelRuleConfig) -> RelabelRule {
    RelabelRule::compile(0, &config).unwrap()
}

fn cfg(action: RelabelAction) -> RelabelRuleConfig {
    RelabelRuleConfig {
        action,
        ..RelabelRuleConfig::default()
    }
}

// =============================================================================
// keep / drop
// =============================================================================

#[test]
fn test_keep_matching_name() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["__name__".into()],
        regex: "up|node_.*".into(),
        ..cfg(RelabelAction::Keep)
    });

    assert!(r.apply(&mut labels(&[("__name__", "up")])));
    assert!(r.apply(&mut labels(&[("__name__", "node_load1")])));
    assert!(!r.apply(&mut labels(&[("__name__", "go_goroutines")])));
}

#[test]
fn test_regex_is_fully_anchored() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["__name__".into()],
        regex: "node".into(),
        ..cfg(RelabelAction::Keep)
    });
    assert!(!r.apply(&mut labels(&[("__name__", "node_cpu")])));
    assert!(!r.apply(&mut labels(&[("__name__", "my_node")])));
    assert!(r.apply(&mut labels(&[("__name__", "node")])));
}

#[test]
fn test_drop_joins_sources_with_separator() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["job".into(), "instance".into()],
        regex: "a;x".into(),
        ..cfg(RelabelAction::Drop)
    });
    assert!(!r.apply(&mut labels(&[("job", "a"), ("instance", "x")])));
    assert!(r.apply(&mut labels(&[("job", "a"), ("instance", "y")])));
}

#[test]
fn test_missing_source_reads_empty() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["env".into()],
        regex: "".into(),
        ..cfg(RelabelAction::Drop)
    });
    assert!(!r.apply(&mut labels(&[("job", "a")])));
    assert!(r.apply(&mut labels(&[("env", "prod")])));
}

#[test]
fn test_keepequal_and_dropequal() {
    let keep = rule(RelabelRuleConfig {
        source_labels: vec!["pod".into()],
        target_label: "container".into(),
        ..cfg(RelabelAction::KeepEqual)
    });
    assert!(keep.apply(&mut labels(&[("pod", "p1"), ("container", "p1")])));
    assert!(!keep.apply(&mut labels(&[("pod", "p1"), ("container", "c1")])));

    let drop = rule(RelabelRuleConfig {
        source_labels: vec!["pod".into()],
        target_label: "container".into(),
        ..cfg(RelabelAction::DropEqual)
    });
    assert!(!drop.apply(&mut labels(&[("pod", "p1"), ("container", "p1")])));
    assert!(drop.apply(&mut labels(&[("pod", "p1"), ("container", "c1")])));
}

// =============================================================================
// replace
// =============================================================================

#[test]
fn test_replace_with_capture_group() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["instance".into()],
        regex: "(.*):.*".into(),
        target_label: "host".into(),
        ..cfg(RelabelAction::Replace)
    });
    let mut set = labels(&[("instance", "10.0.0.1:9100")]);
    assert!(r.apply(&mut set));
    assert_eq!(set.get("host").map(String::as_str), Some("10.0.0.1"));
}

#[test]
fn test_replace_no_match_leaves_labels() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["instance".into()],
        regex: "(.*):.*".into(),
        target_label: "host".into(),
        ..cfg(RelabelAction::Replace)
    });
    let mut set = labels(&[("instance", "no-port")]);
    assert!(r.apply(&mut set));
    assert!(!set.contains_key("host"));
}

#[test]
fn test_replace_empty_result_deletes_target() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["missing".into()],
        target_label: "job".into(),
        ..cfg(RelabelAction::Replace)
    });
    let mut set = labels(&[("job", "a"), ("instance", "x")]);
    assert!(r.apply(&mut set));
    assert!(!set.contains_key("job"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_replace_templated_target() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["kind".into()],
        regex: "(\\w+)".into(),
        target_label: "${1}_flag".into(),
        replacement: "yes".into(),
        ..cfg(RelabelAction::Replace)
    });
    let mut set = labels(&[("kind", "gpu")]);
    assert!(r.apply(&mut set));
    assert_eq!(set.get("gpu_flag").map(String::as_str), Some("yes"));
}

#[test]
fn test_replace_invalid_expanded_target_is_skipped() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["kind".into()],
        target_label: "$1".into(),
        ..cfg(RelabelAction::Replace)
    });
    let mut set = labels(&[("kind", "not-a-name")]);
    assert!(r.apply(&mut set));
    assert_eq!(set, labels(&[("kind", "not-a-name")]));
}

// =============================================================================
// case / hashmod
// =============================================================================

#[test]
fn test_lowercase_and_uppercase() {
    let lower = rule(RelabelRuleConfig {
        source_labels: vec!["env".into()],
        target_label: "env_lower".into(),
        ..cfg(RelabelAction::Lowercase)
    });
    let upper = rule(RelabelRuleConfig {
        source_labels: vec!["env".into()],
        target_label: "env".into(),
        ..cfg(RelabelAction::Uppercase)
    });

    let mut set = labels(&[("env", "Prod")]);
    assert!(lower.apply(&mut set));
    assert!(upper.apply(&mut set));
    assert_eq!(set.get("env_lower").map(String::as_str), Some("prod"));
    assert_eq!(set.get("env").map(String::as_str), Some("PROD"));
}

#[test]
fn test_md5_tail_reference_values() {
    assert_eq!(md5_tail(""), 0xe980_0998_ecf8_427e);
    assert_eq!(md5_tail("a;x"), 0xce40_f17f_5cc1_5827);
}

#[test]
fn test_hashmod_buckets() {
    let r = rule(RelabelRuleConfig {
        source_labels: vec!["job".into(), "instance".into()],
        target_label: "bucket".into(),
        modulus: 4,
        ..cfg(RelabelAction::HashMod)
    });
    let mut set = labels(&[("job", "a"), ("instance", "x")]);
    assert!(r.apply(&mut set));
    assert_eq!(set.get("bucket").map(String::as_str), Some("3"));
}

// =============================================================================
// label name actions
// =============================================================================

#[test]
fn test_labelmap_copies_matching_names() {
    let r = rule(RelabelRuleConfig {
        regex: "__meta_(.+)".into(),
        ..cfg(RelabelAction::LabelMap)
    });
    let mut set = labels(&[("__meta_zone", "eu"), ("job", "a")]);
    assert!(r.apply(&mut set));
    assert_eq!(set.get("zone").map(String::as_str), Some("eu"));
    assert!(set.contains_key("__meta_zone"));
}

#[test]
fn test_labeldrop_and_labelkeep() {
    let drop = rule(RelabelRuleConfig {
        regex: "tmp_.*".into(),
        ..cfg(RelabelAction::LabelDrop)
    });
    let mut set = labels(&[("tmp_a", "1"), ("tmp_b", "2"), ("job", "a")]);
    assert!(drop.apply(&mut set));
    assert_eq!(set, labels(&[("job", "a")]));

    let keep = rule(RelabelRuleConfig {
        regex: "job".into(),
        ..cfg(RelabelAction::LabelKeep)
    });
    let mut set = labels(&[("instance", "x"), ("job", "a")]);
    assert!(keep.apply(&mut set));
    assert_eq!(set, labels(&[("job", "a")]));
}

// =============================================================================
// Compile checks
// =============================================================================

#[test]
fn test_compile_rejects_bad_regex() {
    let err = RelabelRule::compile(3, &RelabelRuleConfig {
        regex: "([a-z".into(),
        ..cfg(RelabelAction::Keep)
    })
    .unwrap_err();
    assert!(matches!(err, TransformError::InvalidRegex { rule: 3, .. }));
}

#[test]
fn test_compile_requires_target_label() {
    for action in [
        RelabelAction::Replace,
        RelabelAction::HashMod,
        RelabelAction::Lowercase,
        RelabelAction::Uppercase,
        RelabelAction::KeepEqual,
        RelabelAction::DropEqual,
    ] {
        let err = RelabelRule::compile(0, &RelabelRuleConfig {
            modulus: 2,
            ..cfg(action)
        })
        .unwrap_err();
        assert!(err.to_string().contains("target_label"), "{action:?}");
    }
}

#[test]
fn test_compile_hashmod_requires_modulus() {
    let err = RelabelRule::compile(0, &RelabelRuleConfig {
        target_label: "bucket".into(),
        ..cfg(RelabelAction::HashMod)
    })
    .unwrap_err();
    assert!(err.to_string().contains("modulus"));
}

#[test]
fn test_compile_labeldrop_rejects_extra_fields() {
    let err = RelabelRule::compile(0, &RelabelRuleConfig {
        source_labels: vec!["job".into()],
        ..cfg(RelabelAction::LabelDrop)
    })
    .unwrap_err();
    assert!(err.to_string().contains("only 'regex'"));
}

#[test]
fn test_compile_keepequal_rejects_regex() {
    let err = RelabelRule::compile(0, &RelabelRuleConfig {
        target_label: "x".into(),
        regex: "a.*".into(),
        ..cfg(RelabelAction::KeepEqual)
    })
    .unwrap_err();
    assert!(matches!(err, TransformError::InvalidRule { action: "keepequal", .. }));
}

#[test]
fn test_label_name_validity() {
    assert!(is_valid_label_name("job"));
    assert!(is_valid_label_name("_x1"));
    assert!(!is_valid_label_name("1x"));
    assert!(!is_valid_label_name("a-b"));
    assert!(!is_valid_label_name(""));
}

#[test]
fn test_target_template_validity() {
    assert!(is_valid_target_template("host"));
    assert!(is_valid_target_template("$1"));
    assert!(is_valid_target_template("${name}_suffix"));
    assert!(is_valid_target_template("prefix_$1"));
    assert!(!is_valid_target_template("1abc"));
    assert!(!is_valid_target_template("a-b"));
    assert!(!is_valid_target_template("${"));
    assert!(!is_valid_target_template("$"));
}
