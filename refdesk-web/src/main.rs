//! Refdesk Web Server
//!
//! Browser-based chat over internal documents, backed by an external
//! generation pipeline.

use clap::Parser;
use refdesk_core::logging::{init_logging, LogFormat, LoggingConfig};
use refdesk_web::server::RefdeskServerBuilder;
use refdesk_web::WebConfig;

/// Refdesk Web Server - internal document chat interface
#[derive(Parser)]
#[command(name = "refdesk-web")]
#[command(about = "A web interface for Refdesk")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Base URL of the generation pipeline service
    #[arg(long)]
    backend_url: Option<String>,

    /// Path to a UI catalog TOML file
    #[arg(long)]
    catalog: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log file path; logs go to stdout when omitted
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Set up logging first
    let logging = LoggingConfig {
        level: args.log_level.clone(),
        format: LogFormat::Compact,
        log_file_path: args.log_file.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    // Create web configuration from environment, then CLI overrides
    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;
    if let Some(backend_url) = args.backend_url {
        config.backend_url = backend_url;
    }
    if args.catalog.is_some() {
        config.catalog_path = args.catalog;
    }

    println!("🚀 Starting Refdesk Web Server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    println!("🔧 Development mode: {}", config.dev_mode);
    println!("🧠 Generation backend: {}", config.backend_url);

    if let Some(catalog) = &config.catalog_path {
        println!("📄 Catalog: {}", catalog);
    }

    // Build and start the server
    let mut builder = RefdeskServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .backend_url(config.backend_url.clone());
    if let Some(catalog) = config.catalog_path.clone() {
        builder = builder.catalog_path(catalog);
    }

    let server = match builder.build().await {
        Ok(server) => {
            println!("✅ Server built successfully");
            server
        }
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server (this will block until shutdown)
    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        use clap::Parser;

        // Test default values
        let args = Args::parse_from(["refdesk-web"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(!args.dev);

        // Test custom values
        let args = Args::parse_from([
            "refdesk-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--backend-url",
            "http://10.0.0.5:8500",
        ]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert!(args.dev);
        assert_eq!(args.backend_url.as_deref(), Some("http://10.0.0.5:8500"));
    }
}
