//! Pipeline error types

use thiserror::Error;

use sroute_sinks::SinkError;
use sroute_transform::TransformError;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The active route table is empty
    #[error("no routes configured")]
    NoRoutes,

    /// A route's relabel chain did not compile
    #[error("route '{route}': {source}")]
    Relabel {
        /// Route name
        route: String,
        /// Underlying rule error
        #[source]
        source: TransformError,
    },

    /// A route's sink could not be created
    #[error("route '{route}': {source}")]
    Sink {
        /// Route name
        route: String,
        /// Underlying sink error
        #[source]
        source: SinkError,
    },

    /// Two routes share a name
    #[error("duplicate route name '{0}'")]
    DuplicateRoute(String),
}

impl PipelineError {
    /// Name of the route the error belongs to, if any
    pub fn route(&self) -> Option<&str> {
        match self {
            Self::NoRoutes => None,
            Self::Relabel { route, .. } | Self::Sink { route, .. } => Some(route),
            Self::DuplicateRoute(route) => Some(route),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::NoRoutes;
        assert_eq!(err.to_string(), "no routes configured");
        assert!(err.route().is_none());

        let err = PipelineError::Sink {
            route: "to-kafka".into(),
            source: SinkError::build("kafka", "to-kafka", "bad template"),
        };
        assert!(err.to_string().starts_with("route 'to-kafka'"));
        assert!(err.to_string().contains("bad template"));
        assert_eq!(err.route(), Some("to-kafka"));

        let err = PipelineError::DuplicateRoute("a".into());
        assert!(err.to_string().contains("duplicate"));
        assert_eq!(err.route(), Some("a"));
    }
}
