use std::process;

use clap::Parser;
use tokio::io::{self, BufReader};
use tokio::net::TcpStream;

mod command;
mod config;
mod error;
mod gate;
mod receiver;
mod session;
#[cfg(test)]
mod tests;

use error::ClientError;
use session::Session;

#[derive(Parser)]
#[command(name = "chat_client", version, about = "Interactive client for the line-command chat server")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Server address, overrides the config file
    #[arg(long, value_name = "ADDR")]
    address: Option<String>,
    /// Display name; prompted for when omitted
    #[arg(long)]
    name: Option<String>,
    /// Give up waiting for an `ls` reply after this many seconds
    #[arg(long, value_name = "SECS")]
    list_timeout: Option<u64>,
}

impl Cli {
    fn resolve(&self) -> config::AppConfig {
        let mut config = config::load_config(&self.config);
        if let Some(address) = &self.address {
            config.server_address = address.clone();
        }
        if self.list_timeout.is_some() {
            config.list_timeout_secs = self.list_timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.resolve();

    let stream = match TcpStream::connect(&config.server_address).await {
        Ok(s) => {
            log::info!("Connected to {}", config.server_address);
            s
        }
        Err(e) => {
            let err = ClientError::Connect {
                addr: config.server_address.clone(),
                source: e,
            };
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli, config, stream).await {
        eprintln!("{}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, config: config::AppConfig, stream: TcpStream) -> Result<(), ClientError> {
    let mut input = BufReader::new(io::stdin());
    let mut console = io::stdout();

    let name = match cli.name {
        Some(name) => session::validate_username(&name)?,
        None => session::read_username(&mut input, &mut console).await?,
    };

    let (reader, writer) = stream.into_split();
    let mut session = Session::new(name, writer)
        .with_reply_timeout(config.list_timeout())
        .with_max_command_len(config.max_command_len);
    session.register().await?;

    let receiver = session.receiver(reader, io::stdout(), config.read_buffer_size);
    let handle = tokio::spawn(receiver.run());

    let result = session.run(input, &mut console).await;

    handle.abort();
    match handle.await {
        Ok(Err(e)) => log::warn!("Receiver stopped: {}", e),
        Err(e) if !e.is_cancelled() => log::error!("Receiver task failed: {}", e),
        _ => {}
    }
    result
}
