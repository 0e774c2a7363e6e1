use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use udnsrs::cli::{Cli, Command};
use udnsrs::response::print_response;
use udnsrs::{zones, UltraApi};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let connection = cli.command.connection();

    let filter = if connection.verbose {
        "udnsrs=debug"
    } else {
        "udnsrs=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut client = UltraApi::connect(
        &connection.username,
        &connection.password,
        connection.client_config(),
    )
    .await
    .context("Failed to authenticate")?;

    match &cli.command {
        Command::CreateZone(args) => {
            let domain = &args.domain.domain;

            let resp = zones::create_zone(&mut client, domain)
                .await
                .with_context(|| format!("Failed to create zone {}", domain))?;
            print_response(&format!("Creating zone {}:", domain), &resp)?;

            let resp = zones::create_a_record(&mut client, domain, &args.address).await?;
            print_response(
                &format!("Creating an A record pointing to {}:", args.address),
                &resp,
            )?;

            let resp = zones::create_cname_record(&mut client, domain).await?;
            print_response(
                &format!("Creating a 'www' CNAME pointing to {}:", domain),
                &resp,
            )?;
        }
        Command::DeleteZone(args) => {
            let resp = zones::delete_zone(&mut client, &args.domain)
                .await
                .with_context(|| format!("Failed to delete zone {}", args.domain))?;
            print_response(&format!("Deleting domain {}:", args.domain), &resp)?;
        }
        Command::ReplaceRrset(args) => {
            let domain = &args.domain.domain;
            let resp = zones::replace_rrset(
                &mut client,
                domain,
                &args.record_type,
                args.owner_name(),
                args.ttl,
                args.rdata.clone(),
            )
            .await?;
            print_response(
                &format!(
                    "Replacing {} records for {} using PUT:",
                    args.record_type,
                    args.owner_name()
                ),
                &resp,
            )?;
        }
        Command::Accounts(_) => {
            let resp = client.get("/accounts").await?;
            print_response("Accounts:", &resp)?;
        }
    }

    Ok(())
}
