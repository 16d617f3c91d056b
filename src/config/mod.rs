//! Configuration module for Wikifeed
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wikifeed::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wikifeed.toml")).unwrap();
//! println!("Crawling {} projects", config.crawler.projects.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlerConfig, DenylistConfig, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
