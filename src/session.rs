use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::command::{self, Command, USAGE};
use crate::error::ClientError;
use crate::gate::SyncGate;
use crate::receiver::Receiver;

pub const USERNAME_MAX_CHARS: usize = 20;
pub const DEFAULT_MAX_COMMAND_LEN: usize = 255;

const WELCOME: &str = "Welcome to chat client console. Please enter commands\n\
                       syntax: [command] [optional recipient] [optional msg]\n";

/// The operator's side of one connection: display name, write half and
/// the gate shared with the receiver.
pub struct Session<W> {
    name: String,
    writer: W,
    gate: Arc<SyncGate>,
    reply_timeout: Option<Duration>,
    max_command_len: usize,
}

impl<W> Session<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(name: String, writer: W) -> Self {
        Self {
            name,
            writer,
            gate: Arc::new(SyncGate::new()),
            reply_timeout: None,
            max_command_len: DEFAULT_MAX_COMMAND_LEN,
        }
    }

    pub fn with_reply_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = len;
        self
    }

    pub fn gate(&self) -> Arc<SyncGate> {
        Arc::clone(&self.gate)
    }

    /// Builds the receiver that shares this session's gate.
    pub fn receiver<R, O>(&self, reader: R, out: O, buffer_size: usize) -> Receiver<R, O>
    where
        R: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        Receiver::new(reader, out, self.gate(), buffer_size)
    }

    pub async fn register(&mut self) -> Result<(), ClientError> {
        write_command(&mut self.writer, &command::registration(&self.name)).await?;
        log::info!("Registered as {}", self.name);
        Ok(())
    }

    /// Prompts for and dispatches commands until `exit`, end of input, or a
    /// fatal error. End of input is treated as `exit`.
    pub async fn run<I, C>(&mut self, input: I, console: &mut C) -> Result<(), ClientError>
    where
        I: AsyncBufRead + Unpin,
        C: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        print(console, WELCOME).await?;

        loop {
            print(console, &format!("[{}]$ ", self.name)).await?;

            let line = tokio::select! {
                line = lines.next_line() => line.map_err(ClientError::Console)?,
                _ = self.gate.closed() => return Err(ClientError::ConnectionClosed),
            };
            let Some(line) = line else {
                log::info!("Input closed, leaving");
                return self.dispatch(Command::Exit, console).await.map(|_| ());
            };
            let line = line.trim_end_matches('\r');

            if line.len() > self.max_command_len {
                print(
                    console,
                    &format!("command too long (max {} bytes)\n", self.max_command_len),
                )
                .await?;
                continue;
            }

            let Some(command) = Command::parse(line) else {
                continue;
            };
            match self.dispatch(command, console).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(ClientError::ReplyTimeout(d)) => {
                    print(console, &format!("{}\n", ClientError::ReplyTimeout(d))).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch<C>(&mut self, command: Command, console: &mut C) -> Result<Flow, ClientError>
    where
        C: AsyncWrite + Unpin,
    {
        match &command {
            Command::Exit => {
                write_command(&mut self.writer, command::EXIT_NOTICE).await?;
                log::info!("Sent exit notice");
                Ok(Flow::Exit)
            }
            Command::ListPeers => {
                self.list_peers().await?;
                Ok(Flow::Continue)
            }
            Command::SendDirect { .. } => {
                if let Some(bytes) = command.wire_bytes() {
                    write_command(&mut self.writer, &bytes).await?;
                }
                Ok(Flow::Continue)
            }
            Command::Invalid { raw_input } => {
                log::debug!("Rejected input {:?}", raw_input);
                print(console, &format!("{}\n", USAGE)).await?;
                Ok(Flow::Continue)
            }
        }
    }

    // Suspends until the receiver has printed the next inbound unit.
    async fn list_peers(&mut self) -> Result<(), ClientError> {
        self.gate
            .wait_after(
                write_command(&mut self.writer, command::LIST_REQUEST),
                self.reply_timeout,
            )
            .await
    }
}

enum Flow {
    Continue,
    Exit,
}

async fn write_command<W>(writer: &mut W, bytes: &[u8]) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    log::debug!("Sending {:?} ({} bytes)", String::from_utf8_lossy(bytes), bytes.len());
    writer.write_all(bytes).await.map_err(ClientError::Write)?;
    writer.flush().await.map_err(ClientError::Write)
}

async fn print<C>(console: &mut C, text: &str) -> Result<(), ClientError>
where
    C: AsyncWrite + Unpin,
{
    console
        .write_all(text.as_bytes())
        .await
        .map_err(ClientError::Console)?;
    console.flush().await.map_err(ClientError::Console)
}

pub fn validate_username(name: &str) -> Result<String, ClientError> {
    let chars = name.chars().count();
    if chars == 0 || chars > USERNAME_MAX_CHARS || name.chars().any(char::is_whitespace) {
        return Err(ClientError::InvalidName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Asks for a display name until a valid one is entered.
pub async fn read_username<I, C>(input: &mut I, console: &mut C) -> Result<String, ClientError>
where
    I: AsyncBufRead + Unpin,
    C: AsyncWrite + Unpin,
{
    loop {
        print(console, "Enter a username (max 20 characters, no spaces):\n").await?;
        let mut line = String::new();
        let n = input
            .read_line(&mut line)
            .await
            .map_err(ClientError::Console)?;
        if n == 0 {
            return Err(ClientError::InputClosed);
        }

        match validate_username(line.trim_end_matches(['\r', '\n'])) {
            Ok(name) => return Ok(name),
            Err(e) => print(console, &format!("{}\n", e)).await?,
        }
    }
}
