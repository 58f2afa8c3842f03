//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Entry point of the telemetry ingest server.
// Loads configuration, connects the RabbitMQ publisher, and serves the HTTP endpoint until
// Ctrl-C, after which the publisher and connection are closed.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rabbitmq::RabbitMQBuilder;
use tracing::{error, info};

use telemetry_ingest::{
    Api, AppState, Config, IngestServices, JwtTokenVerifier, PayloadParser, RabbitQueuePublisher,
};

#[derive(Parser, Debug)]
#[command(name = "telemetry-ingest", about = "Authenticated IoT telemetry ingest endpoint")]
struct Args {
    /// Address to listen on, overrides BIND_ADDR
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Extra env file loaded before the environment is read
    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.env_file {
        dotenv::from_path(path).with_context(|| format!("loading {}", path.display()))?;
    }
    let mut config = Config::try_from_env().context("invalid configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .init();

    let verifier = JwtTokenVerifier::new(&config.jwt).context("building token verifier")?;

    let mut client = RabbitMQBuilder::new(&config.rabbit_url, &config.app_id)
        .publisher(&config.data_topic)
        .build()
        .await
        .context("connecting to RabbitMQ")?;
    let publisher = client.take_publisher(&config.data_topic)?;

    let services = IngestServices {
        token_verifier: Arc::new(verifier),
        payload_parser: PayloadParser::default(),
        queue_publisher: Arc::new(RabbitQueuePublisher::new(
            &config.data_topic,
            publisher.get_dispatcher(),
        )),
        data_topic: config.data_topic.clone(),
        device_id_claim: config.device_id_claim.clone(),
    };

    let api = Api::new(
        config.bind_addr,
        &config.ingest_path,
        AppState::new(services, config.max_body_bytes),
    );

    let served = api.serve(shutdown_signal()).await;

    info!("Closing RabbitMQ publisher");
    if let Err(err) = publisher.close().await {
        error!("Failed to close publisher: {}", err);
    }
    if let Err(err) = client.close().await {
        error!("Failed to close RabbitMQ connection: {}", err);
    }

    served.context("serving HTTP")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(err) => error!("Failed to listen for Ctrl-C: {}", err),
    }
}
