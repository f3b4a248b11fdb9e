//! Configuration for the planner backend
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use uuid::Uuid;

use crate::services::ServiceConfig;

/// ThinkBeyond - business planning canvas backend
#[derive(Parser, Debug, Clone)]
#[command(name = "thinkbeyond")]
#[command(about = "Backend for the ThinkBeyond business planning canvases")]
pub struct Args {
    /// Unique identifier for this instance, reported by the health probe
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory storage when MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "data")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (text or json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Singleton key of the methodology menu document
    #[arg(long, env = "METHODOLOGY_NAME", default_value = "ThinkBeyond")]
    pub methodology_name: String,

    /// Framework used by menu updates that do not name one
    #[arg(long, env = "DEFAULT_FRAMEWORK", default_value = "Micro frameworks")]
    pub default_framework: String,

    /// Onboarding card selected after a progress reset
    #[arg(long, env = "START_CARD", default_value = "What is the change")]
    pub start_card: String,

    /// JSON file with cards, onboarding, menu and companies to load into
    /// empty collections at startup
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,
}

impl Args {
    /// Names the services fall back to
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            methodology_name: self.methodology_name.clone(),
            default_framework: self.default_framework.clone(),
            start_card: self.start_card.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let names = [
            ("MONGODB_DB", &self.mongodb_db),
            ("METHODOLOGY_NAME", &self.methodology_name),
            ("DEFAULT_FRAMEWORK", &self.default_framework),
            ("START_CARD", &self.start_card),
        ];
        for (var, value) in names {
            if value.trim().is_empty() {
                return Err(format!("{} must not be empty", var));
            }
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(format!("LOG_FORMAT must be text or json, got {}", self.log_format));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["thinkbeyond"]);
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.mongodb_db, "data");
        assert_eq!(args.default_framework, "Micro frameworks");
        assert!(args.seed_file.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let args = Args::parse_from(["thinkbeyond", "--log-format", "xml"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let args = Args::parse_from(["thinkbeyond", "--start-card", " "]);
        let err = args.validate().unwrap_err();
        assert!(err.contains("START_CARD"));
    }
}
