use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::client::{ClientConfig, DEFAULT_BASE_URL};

/// Manage UltraDNS zones and record sets from the command line
///
/// Examples:
///   # Create a zone with an A record and a www CNAME
///   udnsrs create-zone example.com -u alice -p secret
///
///   # Replace the apex A records
///   udnsrs replace-rrset example.com -u alice -p secret --rdata 192.0.2.2 --ttl 600
///
///   # Delete a zone
///   udnsrs delete-zone example.com -u alice -p secret
#[derive(Parser, Debug)]
#[command(version, author = "udnsrs authors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a primary zone, an A record at the apex and a www CNAME
    CreateZone(CreateZoneArgs),

    /// Delete a zone
    DeleteZone(DomainArgs),

    /// Replace a record set with PUT
    ReplaceRrset(ReplaceRrsetArgs),

    /// List the accounts visible to the user
    Accounts(ConnectionArgs),
}

impl Command {
    pub fn connection(&self) -> &ConnectionArgs {
        match self {
            Command::CreateZone(args) => &args.domain.connection,
            Command::DeleteZone(args) => &args.connection,
            Command::ReplaceRrset(args) => &args.domain.connection,
            Command::Accounts(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Username for authentication
    #[arg(short = 'u', long = "username")]
    pub username: String,

    /// Password for authentication
    #[arg(short = 'p', long = "password")]
    pub password: String,

    /// API base URL
    #[arg(long = "base-url", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Custom User-Agent header
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (none by default)
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Log outgoing requests and failed response bodies
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Return JSON responses as indented text
    #[arg(long = "pretty")]
    pub pretty: bool,
}

impl ConnectionArgs {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_base_url(&self.base_url)
            .with_debug(self.verbose)
            .with_pretty(self.pretty);
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        config
    }
}

#[derive(Args, Debug, Clone)]
pub struct DomainArgs {
    /// The zone's domain name
    #[arg(value_name = "DOMAIN", value_parser = parse_domain)]
    pub domain: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CreateZoneArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Address for the apex A record
    #[arg(long = "address", default_value = "192.0.2.1")]
    pub address: String,
}

#[derive(Args, Debug, Clone)]
pub struct ReplaceRrsetArgs {
    #[command(flatten)]
    pub domain: DomainArgs,

    /// Record type
    #[arg(short = 't', long = "type", default_value = "A")]
    pub record_type: String,

    /// Owner name (defaults to the zone apex)
    #[arg(long = "owner")]
    pub owner: Option<String>,

    /// Time to live in seconds
    #[arg(long = "ttl", default_value = "600")]
    pub ttl: u32,

    /// Record data, repeatable
    #[arg(long = "rdata", default_value = "192.0.2.2")]
    pub rdata: Vec<String>,
}

impl ReplaceRrsetArgs {
    pub fn owner_name(&self) -> &str {
        self.owner.as_deref().unwrap_or(&self.domain.domain)
    }
}

// ============================================================================
// Parse Function
// ============================================================================

fn parse_domain(s: &str) -> Result<String> {
    let domain = s.trim();
    if domain.is_empty() {
        return Err(anyhow!("Domain cannot be empty"));
    }
    if domain.contains('/') || domain.chars().any(char::is_whitespace) {
        return Err(anyhow!("Invalid domain name: '{}'", s));
    }
    Ok(domain.to_string())
}

// ============================================================================
// Tests
// ============================================================================
