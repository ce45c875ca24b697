//! Route configuration types
//!
//! A route binds a name, an ordered relabel chain and one upstream.
//!
//! ```toml
//! [[routes]]
//! name = "cluster-a"
//!
//! [routes.upstream]
//! type = "remote_write"
//! urls = ["http://a:9090/api/v1/write", "http://b:9090/api/v1/write"]
//! dimension = 4
//!
//! [[routes.relabel]]
//! source_labels = ["__name__"]
//! regex = "up|node_.*"
//! action = "keep"
//! ```

use serde::Deserialize;
use std::time::Duration;

/// One named route
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    /// Unique route name, used as the `route` metric label
    pub name: String,

    /// Delivery target
    pub upstream: UpstreamConfig,

    /// Relabel rules applied in order before delivery
    #[serde(default)]
    pub relabel: Vec<RelabelRuleConfig>,
}

/// Delivery target for a route
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamConfig {
    /// Sharded remote-write endpoint cluster
    RemoteWrite(ClusterConfig),

    /// Kafka topic producer
    Kafka(KafkaConfig),
}

impl UpstreamConfig {
    /// Upstream type name as written in config
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RemoteWrite(_) => "remote_write",
            Self::Kafka(_) => "kafka",
        }
    }
}

// =============================================================================
// Remote-write cluster
// =============================================================================

/// Remote-write cluster upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Endpoint URLs; index order defines node numbering
    pub urls: Vec<String>,

    /// Virtual shard count exposed as `stream_task_id`
    /// Default: 1
    pub dimension: usize,

    /// Labels used for node affinity instead of the full label set
    pub filter_labels: Vec<String>,

    /// Per-request timeout, independent of the inbound request
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            dimension: 1,
            filter_labels: Vec::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Kafka
// =============================================================================

/// Producer compression codec
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KafkaCompression {
    /// No compression (default)
    #[default]
    None,
    /// gzip
    Gzip,
    /// Snappy
    Snappy,
    /// LZ4
    Lz4,
    /// Zstandard
    Zstd,
}

impl KafkaCompression {
    /// librdkafka `compression.codec` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

/// Broker connection security
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityProtocol {
    /// Unencrypted, unauthenticated (default)
    #[default]
    Plaintext,
    /// TLS with client certificate
    Ssl,
    /// SASL over plaintext
    SaslPlaintext,
    /// SASL over TLS
    SaslSsl,
}

impl SecurityProtocol {
    /// librdkafka `security.protocol` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plaintext => "plaintext",
            Self::Ssl => "ssl",
            Self::SaslPlaintext => "sasl_plaintext",
            Self::SaslSsl => "sasl_ssl",
        }
    }

    /// Whether TLS material is needed
    pub fn uses_ssl(&self) -> bool {
        matches!(self, Self::Ssl | Self::SaslSsl)
    }

    /// Whether SASL credentials are needed
    pub fn uses_sasl(&self) -> bool {
        matches!(self, Self::SaslPlaintext | Self::SaslSsl)
    }
}

/// TLS client material
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KafkaSslConfig {
    /// CA certificate file
    pub ca_file: String,
    /// Client certificate file
    pub cert_file: String,
    /// Client private key file
    pub key_file: String,
    /// Private key passphrase
    pub key_password: Option<String>,
}

/// SASL credentials
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KafkaSaslConfig {
    /// e.g. PLAIN, SCRAM-SHA-256, SCRAM-SHA-512
    pub mechanism: String,
    /// SASL username
    pub username: String,
    /// SASL password
    pub password: String,
}

/// Publish retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per topic batch, including the first
    /// Default: 3
    pub attempts: u32,

    /// Wait between attempts after a transient failure
    /// Default: 250ms
    #[serde(with = "humantime_serde")]
    pub backoff: Duration,

    /// Deadline for a single attempt
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(250),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Partitioner names accepted by `balancer`
pub const KNOWN_BALANCERS: &[&str] = &[
    "crc32",
    "hash",
    "roundrobin",
    "murmur2",
    "referencehash",
    "leastbytes",
];

/// Kafka upstream
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Comma-separated bootstrap brokers
    pub brokers: String,

    /// Topic template rendered per series over its label map
    pub topic: String,

    /// Allow-list of `name` or `name{label="value",...}` rules; empty matches all
    #[serde(rename = "match")]
    pub match_rules: Vec<String>,

    /// Default: none
    pub compression: KafkaCompression,

    /// Max messages per producer batch
    /// Default: 1000
    pub batch_num_messages: usize,

    /// Max bytes per producer batch
    /// Default: 1048576
    pub batch_bytes: usize,

    /// Publish detached; `store` returns before delivery
    /// Default: false
    #[serde(rename = "async")]
    pub async_publish: bool,

    /// Partitioning strategy, see `KNOWN_BALANCERS`
    pub balancer: Option<String>,

    /// Default: plaintext
    pub security_protocol: SecurityProtocol,

    /// TLS material, required for `ssl` and `sasl_ssl`
    pub ssl: KafkaSslConfig,

    /// SASL credentials, required for `sasl_*`
    pub sasl: KafkaSaslConfig,

    /// Publish retry policy
    pub retry: RetryConfig,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: String::new(),
            topic: String::new(),
            match_rules: Vec::new(),
            compression: KafkaCompression::None,
            batch_num_messages: 1000,
            batch_bytes: 1_048_576,
            async_publish: false,
            balancer: None,
            security_protocol: SecurityProtocol::Plaintext,
            ssl: KafkaSslConfig::default(),
            sasl: KafkaSaslConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

// =============================================================================
// Relabel
// =============================================================================

/// Relabel action, following the Prometheus relabeling model
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelabelAction {
    /// Write the expanded replacement into `target_label` (default)
    #[default]
    Replace,
    /// Drop the series unless the joined source values match
    Keep,
    /// Drop the series if the joined source values match
    Drop,
    /// Keep only if the joined source values equal `target_label`'s value
    KeepEqual,
    /// Drop if the joined source values equal `target_label`'s value
    DropEqual,
    /// Set `target_label` to md5(joined) mod `modulus`
    HashMod,
    /// Copy labels whose names match to the expanded replacement name
    LabelMap,
    /// Remove labels whose names match
    LabelDrop,
    /// Remove labels whose names do not match
    LabelKeep,
    /// Set `target_label` to the lowercased joined values
    Lowercase,
    /// Set `target_label` to the uppercased joined values
    Uppercase,
}

impl RelabelAction {
    /// Action name as written in config
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::KeepEqual => "keepequal",
            Self::DropEqual => "dropequal",
            Self::HashMod => "hashmod",
            Self::LabelMap => "labelmap",
            Self::LabelDrop => "labeldrop",
            Self::LabelKeep => "labelkeep",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
        }
    }
}

/// Raw relabel rule as written in config
///
/// Compiled and checked when the route is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelabelRuleConfig {
    /// Labels whose values are joined with `separator`
    pub source_labels: Vec<String>,
    /// Default: ";"
    pub separator: String,
    /// Anchored regular expression
    /// Default: "(.*)"
    pub regex: String,
    /// Modulus for `hashmod`
    pub modulus: u64,
    /// Label written by replace-style actions
    pub target_label: String,
    /// Replacement with `$1` / `${name}` references
    /// Default: "$1"
    pub replacement: String,
    /// Default: replace
    pub action: RelabelAction,
}

impl Default for RelabelRuleConfig {
    fn default() -> Self {
        Self {
            source_labels: Vec::new(),
            separator: ";".into(),
            regex: "(.*)".into(),
            modulus: 0,
            target_label: String::new(),
            replacement: "$1".into(),
            action: RelabelAction::Replace,
        }
    }
}
