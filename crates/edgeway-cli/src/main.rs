//! # Edgeway CLI Entry Point
//!
//! Starts each Edgeway process and offers two small registry commands for
//! scripting.
//!
//! ## Usage
//!
//! ```bash
//! # Start the service registry
//! edgeway registry -b 0.0.0.0:3001
//!
//! # Start a posts backend that registers itself
//! edgeway posts -b 0.0.0.0:50052 --registry http://127.0.0.1:3001 \
//!   --public-url http://127.0.0.1:50052
//!
//! # Start the gateway with one static instance plus whatever the registry knows
//! edgeway gateway -b 0.0.0.0:3000 -r http://127.0.0.1:3001 -i http://127.0.0.1:50053
//!
//! # Query / populate the registry (outputs raw JSON)
//! edgeway lookup http://127.0.0.1:3001 AnimalService
//! edgeway register http://127.0.0.1:3001 AnimalService http://127.0.0.1:50052
//! ```
//!
//! ## URL Format
//!
//! Registry, instance and public URLs must include the `http://` or
//! `https://` prefix. Bind addresses are plain `host:port`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;
use edgeway_client::RegistryClient;
use edgeway_common::ServiceLocation;
use edgeway_gateway::{DispatcherConfig, Gateway, GatewayConfig, RetryConfig};
use edgeway_posts::PostServiceConfig;
use edgeway_registry::ServiceRegistry;

/// Env var consulted for the posts backend's public URL when the flag is absent.
const PUBLIC_URL_ENV: &str = "EDGEWAY_PUBLIC_URL";

/// Validates that a URL string starts with http:// or https://
fn validate_http_url(url: &str, description: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Invalid {}: '{}' must start with http:// or https://",
            description,
            url
        ))
    }
}

fn parse_bind(bind: &str) -> Result<SocketAddr> {
    bind.parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", bind, e))
}

#[derive(FromArgs)]
/// Edgeway - fault-tolerant edge gateway
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Registry(RegistryArgs),
    Gateway(GatewayArgs),
    Posts(PostsArgs),
    Lookup(LookupArgs),
    Register(RegisterArgs),
}

#[derive(FromArgs)]
#[argh(subcommand, name = "registry")]
/// start the service registry
struct RegistryArgs {
    /// address to bind the registry's HTTP server to
    #[argh(option, short = 'b', default = "\"0.0.0.0:3001\".into()")]
    bind: String,
}

/// Arguments for starting the gateway.
///
/// The backend pool is the static `--instance` list followed by the address
/// the registry returns for `--service`. Discovery failure is fatal only
/// when no static instance is given.
#[derive(FromArgs)]
#[argh(subcommand, name = "gateway")]
/// start the edge gateway
struct GatewayArgs {
    /// address to bind the gateway's HTTP server to
    #[argh(option, short = 'b', default = "\"0.0.0.0:3000\".into()")]
    bind: String,

    /// registry URL used for discovery (repeatable, tried in order)
    #[argh(option, short = 'r', long = "registry")]
    registries: Vec<String>,

    /// static backend instance URL (repeatable)
    #[argh(option, short = 'i', long = "instance")]
    instances: Vec<String>,

    /// logical name of the backend service
    #[argh(option, long = "service", default = "\"AnimalService\".into()")]
    service: String,

    /// consecutive failures before an instance is evicted
    #[argh(option, long = "max-failures", default = "3")]
    max_failures: u32,

    /// deadline for a single backend call in milliseconds
    #[argh(option, long = "timeout-ms", default = "3500")]
    timeout_ms: u64,

    /// attempts for the registry lookup at startup
    #[argh(option, long = "lookup-attempts", default = "3")]
    lookup_attempts: usize,
}

/// Arguments for starting a posts backend.
///
/// The public URL is what the registry hands out to gateways. Priority:
/// `--public-url`, then `EDGEWAY_PUBLIC_URL`, then the bind address.
#[derive(FromArgs)]
#[argh(subcommand, name = "posts")]
/// start an animal-posts backend
struct PostsArgs {
    /// address to bind the backend's RPC server to
    #[argh(option, short = 'b', default = "\"0.0.0.0:50052\".into()")]
    bind: String,

    /// registry URL to register with
    #[argh(option, long = "registry")]
    registry: Option<String>,

    /// name to register under
    #[argh(option, long = "service", default = "\"AnimalService\".into()")]
    service: String,

    /// public URL announced to the registry
    #[argh(option, long = "public-url")]
    public_url: Option<String>,

    /// deadline for a single RPC task in milliseconds
    #[argh(option, long = "task-timeout-ms", default = "5000")]
    task_timeout_ms: u64,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "lookup")]
/// resolve a service name through the registry
struct LookupArgs {
    /// registry URL
    #[argh(positional)]
    registry: String,

    /// service name to resolve
    #[argh(positional)]
    name: String,
}

#[derive(FromArgs)]
#[argh(subcommand, name = "register")]
/// register a service address with the registry
struct RegisterArgs {
    /// registry URL
    #[argh(positional)]
    registry: String,

    /// service name
    #[argh(positional)]
    name: String,

    /// service URL
    #[argh(positional)]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // lookup/register print raw JSON for piping, so they stay quiet
    if !matches!(cli.command, Commands::Lookup(_) | Commands::Register(_)) {
        // Set default log level to INFO, but allow RUST_LOG env var to override
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Registry(args) => {
            let addr = parse_bind(&args.bind)?;
            tracing::info!("Starting Edgeway service registry");

            let registry = Arc::new(ServiceRegistry::new());
            edgeway_registry::HttpServer::new(registry).run(addr).await?;
            Ok(())
        }
        Commands::Gateway(args) => run_gateway(args).await,
        Commands::Posts(args) => run_posts(args).await,
        Commands::Lookup(args) => {
            validate_http_url(&args.registry, "registry URL")?;
            let url = RegistryClient::default()
                .lookup(&args.registry, &args.name)
                .await
                .map_err(|e| anyhow::anyhow!("Lookup of {} failed: {}", args.name, e))?;
            println!("{}", serde_json::to_string(&ServiceLocation { url })?);
            Ok(())
        }
        Commands::Register(args) => {
            validate_http_url(&args.registry, "registry URL")?;
            validate_http_url(&args.url, "service URL")?;
            RegistryClient::default()
                .register(&args.registry, &args.name, &args.url)
                .await
                .map_err(|e| anyhow::anyhow!("Registration of {} failed: {}", args.name, e))?;
            println!(
                "{}",
                serde_json::json!({ "serviceName": args.name, "serviceUrl": args.url })
            );
            Ok(())
        }
    }
}

fn gateway_config(args: GatewayArgs) -> Result<GatewayConfig> {
    for registry in &args.registries {
        validate_http_url(registry, "registry URL")?;
    }
    for instance in &args.instances {
        validate_http_url(instance, "instance URL")?;
    }

    let defaults = GatewayConfig::default();
    Ok(GatewayConfig {
        bind: parse_bind(&args.bind)?,
        registry_urls: args.registries,
        service_name: args.service,
        instances: args.instances,
        dispatcher: DispatcherConfig {
            max_failures: args.max_failures,
            timeout: Duration::from_millis(args.timeout_ms),
        },
        registry_dispatcher: defaults.registry_dispatcher,
        retry: RetryConfig {
            max_attempts: args.lookup_attempts,
        },
    })
}

async fn run_gateway(args: GatewayArgs) -> Result<()> {
    let config = gateway_config(args)?;
    tracing::info!("Starting Edgeway gateway for {}", config.service_name);

    if config.registry_urls.is_empty() && config.instances.is_empty() {
        tracing::warn!("No registry or instances specified! Use --registry or --instance.");
    }

    let gateway = Gateway::bootstrap(&config, RegistryClient::default()).await?;
    edgeway_gateway::HttpServer::new(Arc::new(gateway))
        .run(config.bind)
        .await?;
    Ok(())
}

fn posts_config(args: PostsArgs, env_public_url: Option<String>) -> Result<PostServiceConfig> {
    if let Some(registry) = &args.registry {
        validate_http_url(registry, "registry URL")?;
    }

    // Priority: CLI flag > Env var > bind address
    let public_url = args.public_url.or(env_public_url);
    if let Some(url) = &public_url {
        validate_http_url(url, "public URL")?;
    }

    Ok(PostServiceConfig {
        bind: parse_bind(&args.bind)?,
        service_name: args.service,
        registry_url: args.registry,
        public_url,
        task_timeout: Duration::from_millis(args.task_timeout_ms),
        ..Default::default()
    })
}

async fn run_posts(args: PostsArgs) -> Result<()> {
    let config = posts_config(args, std::env::var(PUBLIC_URL_ENV).ok())?;
    tracing::info!(
        "Starting Edgeway posts backend as {} ({})",
        config.service_name,
        config.advertised_url()
    );

    edgeway_posts::run(config).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("http://127.0.0.1:3001", "registry URL").is_ok());
        assert!(validate_http_url("https://registry.example", "registry URL").is_ok());

        let err = validate_http_url("127.0.0.1:3001", "registry URL").unwrap_err();
        assert!(err.to_string().contains("must start with http:// or https://"));
    }

    #[test]
    fn test_cli_parse_registry_default_bind() {
        let args: Cli = Cli::from_args(&["edgeway"], &["registry"]).unwrap();
        match args.command {
            Commands::Registry(RegistryArgs { bind }) => assert_eq!(bind, "0.0.0.0:3001"),
            _ => panic!("Expected Registry command"),
        }
    }

    #[test]
    fn test_cli_parse_gateway() {
        let args: Cli = Cli::from_args(
            &["edgeway"],
            &[
                "gateway",
                "-b", "127.0.0.1:3000",
                "-r", "http://127.0.0.1:3001",
                "-i", "http://127.0.0.1:50052",
                "-i", "http://127.0.0.1:50053",
                "--max-failures", "2",
            ],
        )
        .unwrap();

        match args.command {
            Commands::Gateway(args) => {
                assert_eq!(args.registries, vec!["http://127.0.0.1:3001"]);
                assert_eq!(args.instances.len(), 2);
                assert_eq!(args.service, "AnimalService");
                assert_eq!(args.timeout_ms, 3500);

                let config = gateway_config(args).unwrap();
                assert_eq!(config.bind.port(), 3000);
                assert_eq!(config.dispatcher.max_failures, 2);
                assert_eq!(config.dispatcher.timeout, Duration::from_millis(3500));
                assert_eq!(config.retry.max_attempts, 3);
            }
            _ => panic!("Expected Gateway command"),
        }
    }

    #[test]
    fn test_gateway_rejects_bare_instance() {
        let args: Cli =
            Cli::from_args(&["edgeway"], &["gateway", "-i", "127.0.0.1:50052"]).unwrap();
        match args.command {
            Commands::Gateway(args) => assert!(gateway_config(args).is_err()),
            _ => panic!("Expected Gateway command"),
        }
    }

    #[test]
    fn test_posts_public_url_priority() {
        let parse = |extra: &[&str]| -> PostsArgs {
            let mut argv = vec!["posts", "-b", "127.0.0.1:50052"];
            argv.extend_from_slice(extra);
            match Cli::from_args(&["edgeway"], &argv).unwrap().command {
                Commands::Posts(args) => args,
                _ => panic!("Expected Posts command"),
            }
        };

        let config = posts_config(
            parse(&["--public-url", "http://flag:1"]),
            Some("http://env:1".into()),
        )
        .unwrap();
        assert_eq!(config.advertised_url(), "http://flag:1");

        let config = posts_config(parse(&[]), Some("http://env:1".into())).unwrap();
        assert_eq!(config.advertised_url(), "http://env:1");

        let config = posts_config(parse(&[]), None).unwrap();
        assert_eq!(config.advertised_url(), "127.0.0.1:50052");
        assert_eq!(config.task_timeout, Duration::from_secs(5));

        assert!(posts_config(parse(&["--public-url", "flag:1"]), None).is_err());
    }

    #[test]
    fn test_cli_parse_lookup_and_register() {
        let args: Cli = Cli::from_args(
            &["edgeway"],
            &["lookup", "http://127.0.0.1:3001", "AnimalService"],
        )
        .unwrap();
        match args.command {
            Commands::Lookup(LookupArgs { registry, name }) => {
                assert_eq!(registry, "http://127.0.0.1:3001");
                assert_eq!(name, "AnimalService");
            }
            _ => panic!("Expected Lookup command"),
        }

        let args: Cli = Cli::from_args(
            &["edgeway"],
            &["register", "http://127.0.0.1:3001", "AnimalService", "http://posts:50052"],
        )
        .unwrap();
        assert!(matches!(args.command, Commands::Register(RegisterArgs { .. })));
    }

    #[test]
    fn test_cli_parse_missing_subcommand() {
        assert!(Cli::from_args(&["edgeway"], &[]).is_err());
    }
}
