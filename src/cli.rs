//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Run the token gate handlers locally against a real issuer
#[derive(Parser, Debug)]
#[command(name = "token-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "TOKEN_GATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "TOKEN_GATE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "TOKEN_GATE_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the Authorizer and print its decision
    Authorize {
        /// Bearer token (with or without the `Bearer ` prefix)
        #[arg(short, long, env = "TOKEN_GATE_TOKEN")]
        token: String,

        /// Method ARN the decision applies to
        #[arg(
            short,
            long,
            default_value = "arn:aws:execute-api:local:000000000000:local/dev/GET/"
        )]
        method_arn: String,
    },

    /// Run the Introspector and print its response
    Introspect {
        /// Bearer token (with or without the `Bearer ` prefix)
        #[arg(short, long, env = "TOKEN_GATE_TOKEN")]
        token: String,

        /// Issuer as the Authorizer would place it in the request context
        #[arg(short, long)]
        issuer: String,
    },

    /// Fetch and print an issuer's OpenID discovery document
    Discover {
        /// Issuer URL
        #[arg(short, long)]
        issuer: String,
    },
}
