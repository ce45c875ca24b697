//! Configuration validation
//!
//! Structural checks that make a file unusable:
//! - Route names are unique and non-empty
//! - Upstreams carry their required fields
//! - TLS and SASL material is present when the security protocol needs it
//! - The listen address parses
//!
//! Anything that needs compiling (regexes, templates, match rules) is checked
//! when routes are built so a bad rule only disables its own route.

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::routes::{ClusterConfig, KNOWN_BALANCERS, KafkaConfig, RouteConfig, UpstreamConfig};
use std::collections::HashSet;
use std::net::SocketAddr;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_metrics(config)?;
    validate_routes(&config.routes)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.listen.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::invalid_value(
            "server",
            "server",
            "listen",
            format!("'{}' is not a socket address", config.server.listen),
        ));
    }
    if config.server.max_body_size == 0 {
        return Err(ConfigError::invalid_value(
            "server",
            "server",
            "max_body_size",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_metrics(config: &Config) -> Result<()> {
    if config.metrics.enabled && config.metrics.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "metrics",
            "metrics",
            "interval",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_routes(routes: &[RouteConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for route in routes {
        if route.name.trim().is_empty() {
            return Err(ConfigError::missing_field("route", "<unnamed>", "name"));
        }
        if !seen.insert(route.name.as_str()) {
            return Err(ConfigError::duplicate_route(&route.name));
        }

        match &route.upstream {
            UpstreamConfig::RemoteWrite(cluster) => validate_cluster(&route.name, cluster)?,
            UpstreamConfig::Kafka(kafka) => validate_kafka(&route.name, kafka)?,
        }
    }
    Ok(())
}

fn validate_cluster(name: &str, cluster: &ClusterConfig) -> Result<()> {
    if cluster.urls.is_empty() {
        return Err(ConfigError::missing_field("remote_write", name, "urls"));
    }
    for url in &cluster.urls {
        if !is_http_url(url) {
            return Err(ConfigError::invalid_value(
                "remote_write",
                name,
                "urls",
                format!("'{url}' is not an http(s) URL"),
            ));
        }
    }
    if cluster.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "remote_write",
            name,
            "timeout",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_kafka(name: &str, kafka: &KafkaConfig) -> Result<()> {
    if kafka.brokers.split(',').all(|b| b.trim().is_empty()) {
        return Err(ConfigError::missing_field("kafka", name, "brokers"));
    }
    if kafka.topic.trim().is_empty() {
        return Err(ConfigError::missing_field("kafka", name, "topic"));
    }
    if let Some(balancer) = &kafka.balancer
        && !KNOWN_BALANCERS.contains(&balancer.as_str())
    {
        return Err(ConfigError::invalid_value(
            "kafka",
            name,
            "balancer",
            format!("'{balancer}' is not one of {}", KNOWN_BALANCERS.join(", ")),
        ));
    }
    if kafka.retry.attempts == 0 {
        return Err(ConfigError::invalid_value(
            "kafka",
            name,
            "retry.attempts",
            "must be at least 1",
        ));
    }
    if kafka.batch_num_messages == 0 {
        return Err(ConfigError::invalid_value(
            "kafka",
            name,
            "batch_num_messages",
            "must be greater than zero",
        ));
    }

    if kafka.security_protocol.uses_ssl() {
        let ssl = &kafka.ssl;
        if ssl.ca_file.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "ssl.ca_file"));
        }
        if ssl.cert_file.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "ssl.cert_file"));
        }
        if ssl.key_file.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "ssl.key_file"));
        }
    }
    if kafka.security_protocol.uses_sasl() {
        let sasl = &kafka.sasl;
        if sasl.mechanism.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "sasl.mechanism"));
        }
        if sasl.username.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "sasl.username"));
        }
        if sasl.password.is_empty() {
            return Err(ConfigError::missing_field("kafka", name, "sasl.password"));
        }
    }
    Ok(())
}

/// `http://host...` or `https://host...` with a non-empty host
fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or("");
            !host.is_empty() && !host.starts_with(':')
        }
        None => false,
    }
}
