// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There are no subcommands: running `link-prober` starts the server. Every
// flag can also be set with an environment variable, which is handy in
// containers:
//
//   link-prober --port 9000 --pool-size 50
//   PROBER_PORT=9000 PROBER_POOL_SIZE=50 link-prober
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;

use crate::config::{
    ConfigError, ProbeConfig, ServerConfig, DEFAULT_MAX_REDIRECTS, DEFAULT_POOL_SIZE,
};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-prober",
    version,
    about = "An HTTP service that probes batches of URLs concurrently",
    long_about = "link-prober serves POST /parse. Send it {\"urls\": [...]} and it GETs every URL \
                  with a bounded pool of workers, answering with the status lines in input order."
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "PROBER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PROBER_PORT", default_value_t = 8888)]
    pub port: u16,

    /// Maximum number of concurrent GETs per request (at least 1)
    ///
    /// This bounds how many outbound connections a single batch can open
    #[arg(long, env = "PROBER_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// How many redirects a probe follows before reporting an error
    #[arg(long, env = "PROBER_MAX_REDIRECTS", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,
}

impl Cli {
    /// Validates the parsed flags into a server configuration.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let probe = ProbeConfig {
            pool_size: self.pool_size,
            max_redirects: self.max_redirects,
        };
        ServerConfig::new(&self.host, self.port, probe)
    }
}
