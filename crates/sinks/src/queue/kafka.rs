//! Kafka publisher backed by an rdkafka `FutureProducer`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use rdkafka::ClientConfig;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use sroute_config::KafkaConfig;

use super::publisher::{Connector, PublishError, Publisher};

/// librdkafka partitioner for a configured balancer name
///
/// | balancer                      | partitioner         |
/// |-------------------------------|---------------------|
/// | `crc32`                       | `consistent_random` |
/// | `hash`                        | `fnv1a_random`      |
/// | `murmur2`                     | `murmur2_random`    |
/// | anything else, or unset       | `random`            |
pub fn partitioner(balancer: Option<&str>) -> &'static str {
    match balancer {
        Some("crc32") => "consistent_random",
        Some("hash") => "fnv1a_random",
        Some("murmur2") => "murmur2_random",
        _ => "random",
    }
}

/// Translate the route config into librdkafka properties
pub fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut cfg = ClientConfig::new();
    cfg.set("bootstrap.servers", &config.brokers);
    cfg.set("compression.type", config.compression.as_str());
    cfg.set("batch.num.messages", config.batch_num_messages.to_string());
    cfg.set("batch.size", config.batch_bytes.to_string());
    cfg.set("partitioner", partitioner(config.balancer.as_deref()));
    cfg.set(
        "message.timeout.ms",
        config.retry.attempt_timeout.as_millis().to_string(),
    );
    cfg.set("acks", if config.async_publish { "1" } else { "all" });
    cfg.set("security.protocol", config.security_protocol.as_str());

    if config.security_protocol.uses_ssl() {
        cfg.set("ssl.ca.location", &config.ssl.ca_file);
        cfg.set("ssl.certificate.location", &config.ssl.cert_file);
        cfg.set("ssl.key.location", &config.ssl.key_file);
        if let Some(password) = &config.ssl.key_password {
            cfg.set("ssl.key.password", password);
        }
    }
    if config.security_protocol.uses_sasl() {
        cfg.set("sasl.mechanisms", &config.sasl.mechanism);
        cfg.set("sasl.username", &config.sasl.username);
        cfg.set("sasl.password", &config.sasl.password);
    }
    cfg
}

/// Classify an rdkafka error for the retry loop
pub fn classify(error: &KafkaError) -> PublishError {
    use RDKafkaErrorCode as Code;

    let message = error.to_string();
    match error.rdkafka_error_code() {
        Some(
            Code::LeaderNotAvailable
            | Code::NotLeaderForPartition
            | Code::RequestTimedOut
            | Code::MessageTimedOut
            | Code::OperationTimedOut
            | Code::TimedOutQueue,
        ) => PublishError::transient(message),
        Some(
            Code::AllBrokersDown | Code::BrokerTransportFailure | Code::Fail | Code::Unknown,
        ) => PublishError::unknown(message),
        Some(_) => PublishError::fatal(message),
        None => match error {
            KafkaError::Canceled => PublishError::unknown(message),
            _ => PublishError::fatal(message),
        },
    }
}

/// Kafka publisher; every `publish` waits for the broker acknowledgements
pub struct KafkaPublisher {
    producer: FutureProducer,
    queue_timeout: Duration,
}

// FutureProducer doesn't impl Debug
impl std::fmt::Debug for KafkaPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaPublisher")
            .field("queue_timeout", &self.queue_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, topic: &str, payloads: &[Vec<u8>]) -> Result<(), PublishError> {
        let deliveries = payloads.iter().map(|payload| {
            // FutureRecord is generic over the key type even when no key is set
            let record: FutureRecord<'_, (), [u8]> = FutureRecord::to(topic).payload(payload.as_slice());
            self.producer
                .send(record, Timeout::After(self.queue_timeout))
        });

        for result in join_all(deliveries).await {
            if let Err((e, _message)) = result {
                return Err(classify(&e));
            }
        }
        Ok(())
    }
}

/// Builds `KafkaPublisher`s from a fixed client config
pub struct KafkaConnector {
    config: ClientConfig,
    queue_timeout: Duration,
}

impl KafkaConnector {
    /// Connector for one route's config
    pub fn new(config: &KafkaConfig) -> Self {
        Self {
            config: client_config(config),
            queue_timeout: config.retry.attempt_timeout,
        }
    }
}

impl Connector for KafkaConnector {
    fn connect(&self) -> Result<Arc<dyn Publisher>, PublishError> {
        let producer: FutureProducer = self
            .config
            .create()
            .map_err(|e| PublishError::fatal(format!("failed to create producer: {}", e)))?;
        Ok(Arc::new(KafkaPublisher {
            producer,
            queue_timeout: self.queue_timeout,
        }))
    }
}

#[cfg(test)]
mod tests {
    use sroute_config::{KafkaCompression, KafkaSaslConfig, SecurityProtocol};

    use super::*;
    use crate::queue::ErrorClass;

    #[test]
    fn test_partitioner_mapping() {
        assert_eq!(partitioner(Some("crc32")), "consistent_random");
        assert_eq!(partitioner(Some("hash")), "fnv1a_random");
        assert_eq!(partitioner(Some("murmur2")), "murmur2_random");
        assert_eq!(partitioner(Some("roundrobin")), "random");
        assert_eq!(partitioner(Some("leastbytes")), "random");
        assert_eq!(partitioner(None), "random");
    }

    #[test]
    fn test_client_config_properties() {
        let config = KafkaConfig {
            brokers: "k1:9092,k2:9092".into(),
            topic: "metrics".into(),
            compression: KafkaCompression::Snappy,
            balancer: Some("hash".into()),
            security_protocol: SecurityProtocol::SaslPlaintext,
            sasl: KafkaSaslConfig {
                mechanism: "PLAIN".into(),
                username: "u".into(),
                password: "p".into(),
            },
            ..KafkaConfig::default()
        };
        let cfg = client_config(&config);
        assert_eq!(cfg.get("bootstrap.servers"), Some("k1:9092,k2:9092"));
        assert_eq!(cfg.get("compression.type"), Some("snappy"));
        assert_eq!(cfg.get("batch.num.messages"), Some("1000"));
        assert_eq!(cfg.get("batch.size"), Some("1048576"));
        assert_eq!(cfg.get("partitioner"), Some("fnv1a_random"));
        assert_eq!(cfg.get("message.timeout.ms"), Some("10000"));
        assert_eq!(cfg.get("acks"), Some("all"));
        assert_eq!(cfg.get("security.protocol"), Some("sasl_plaintext"));
        assert_eq!(cfg.get("sasl.mechanisms"), Some("PLAIN"));
        assert_eq!(cfg.get("ssl.ca.location"), None);
    }

    #[test]
    fn test_classify_codes() {
        let transient = KafkaError::MessageProduction(RDKafkaErrorCode::LeaderNotAvailable);
        assert_eq!(classify(&transient).class, ErrorClass::Transient);

        let timed_out = KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut);
        assert_eq!(classify(&timed_out).class, ErrorClass::Transient);

        let down = KafkaError::MessageProduction(RDKafkaErrorCode::AllBrokersDown);
        assert_eq!(classify(&down).class, ErrorClass::Unknown);

        let too_large = KafkaError::MessageProduction(RDKafkaErrorCode::MessageSizeTooLarge);
        assert_eq!(classify(&too_large).class, ErrorClass::Fatal);

        assert_eq!(
            classify(&KafkaError::Canceled).class,
            ErrorClass::Unknown
        );
    }

    #[test]
    fn test_connector_creates_producer_without_broker() {
        let config = KafkaConfig {
            brokers: "127.0.0.1:1".into(),
            topic: "metrics".into(),
            ..KafkaConfig::default()
        };
        assert!(KafkaConnector::new(&config).connect().is_ok());
    }
}
