mod digest;
mod output;

use std::time::Duration;

use akv_signer::config::{DEFAULT_AUTHORITY_HOST, DEFAULT_VAULT_RESOURCE};
use akv_signer::{ApiVersion, ClientConfig, Credential, RestClientFactory, resolve};
use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::digest::{digest_of_digest, read_digest};
use crate::output::write_response;

const WRONG_ARGUMENT_COUNT: i32 = 65;
const BAD_ARGUMENT: i32 = 66;

/// Sign a package repository digest with an Azure Key Vault RSA key.
#[derive(Parser)]
#[clap(
    name = "akv-sign",
    version,
    after_help = "Example invocation:\n    akv-sign https://foo.vault.azure.net/keys/bar\n\n\
                  The SHA256 digest to be signed should be passed on stdin in hex form."
)]
struct Args {
    /// The URI (versioned or unversioned) of the Key Vault key to use.
    #[clap(env = "AKV_KEY_URI")]
    key_uri: String,
    /// Turn on debug messages.
    #[clap(long)]
    debug: bool,

    // Service principal; without all three, managed identity is used.
    #[clap(long, env = "AZURE_TENANT_ID")]
    tenant_id: Option<String>,
    #[clap(long, env = "AZURE_CLIENT_ID")]
    client_id: Option<String>,
    #[clap(long, env = "AZURE_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    #[clap(long, env = "AZURE_AUTHORITY_HOST", default_value = DEFAULT_AUTHORITY_HOST)]
    authority_host: String,
    #[clap(long, env = "AKV_RESOURCE", default_value = DEFAULT_VAULT_RESOURCE)]
    vault_resource: String,
    #[clap(long, env = "AKV_API_VERSION", default_value = "7.4")]
    api_version: ApiVersion,

    /// How long to wait for the digest on stdin.
    #[clap(long, env = "AKV_READ_TIMEOUT_MS", default_value = "2000")]
    read_timeout_ms: u64,
    #[clap(long, env = "AKV_REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(usage_exit_code(err.kind()));
        }
    };
    init_tracing(args.debug);

    // Exit without dropping the runtime: a stdin read left behind by a
    // timeout cannot be cancelled and would block shutdown.
    match run(args).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("{}", error_line(&err));
            std::process::exit(BAD_ARGUMENT);
        }
    }
}

/// Help and version requests succeed; anything else clap rejects is a usage error.
fn usage_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => WRONG_ARGUMENT_COUNT,
    }
}

fn error_line(err: &anyhow::Error) -> String {
    format!("[ERROR] {err:#}")
}

async fn run(args: Args) -> Result<()> {
    let hex_digest = read_digest(tokio::io::stdin(), Duration::from_millis(args.read_timeout_ms))
        .await
        .context("Reading digest failed")?;
    debug!(digest = %hex_digest, "got digest");

    let config = ClientConfig {
        api_version: args.api_version,
        authority_host: args.authority_host,
        vault_resource: args.vault_resource,
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        ..ClientConfig::new(Credential::from_parts(
            args.tenant_id,
            args.client_id,
            args.client_secret,
        ))
    };
    debug!(
        credential = ?config.credential,
        api_version = %config.api_version,
        "client configuration"
    );
    let factory = RestClientFactory::new(config);

    let key = resolve(&args.key_uri, &factory)
        .await
        .context("Unable to retrieve the signing key")?;
    let result = key
        .sign(&digest_of_digest(&hex_digest))
        .await
        .context("Unable to sign digest")?;
    info!(key_id = %result.key_id, "signed digest");

    let stdout = std::io::stdout();
    write_response(&mut stdout.lock(), &result.signature, key.public_key_pem().as_str())
        .context("Unexpected error writing the signature")?;
    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
