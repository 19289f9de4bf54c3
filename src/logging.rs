//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Args;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(log_level: &str) -> String {
    format!("peerlink={},info", log_level)
}

/// Install the global subscriber: `RUST_LOG` if set, else the configured
/// level, with text or JSON output per `LOG_FORMAT`
pub fn init(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&args.log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("debug");
        assert_eq!(filter, "peerlink=debug,info");
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
