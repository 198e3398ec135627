pub const USAGE: &str = "bad command\nsyntax: [command] [optional recipient] [optional msg]";

pub const LIST_REQUEST: &[u8] = b"ls";
pub const EXIT_NOTICE: &[u8] = b"exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    ListPeers,
    SendDirect { recipient: String, body: String },
    Invalid { raw_input: String },
}

impl Command {
    /// Decodes one line of operator input. Blank lines yield `None`.
    ///
    /// The command word runs from the start of the line to the first space,
    /// so leading whitespace makes any command invalid.
    pub fn parse(line: &str) -> Option<Command> {
        if line.is_empty() {
            return None;
        }

        let word = line.split_once(' ').map_or(line, |(word, _)| word);
        let command = match word {
            "exit" => Command::Exit,
            "ls" => Command::ListPeers,
            "send" => parse_send(line).unwrap_or_else(|| invalid(line)),
            _ => invalid(line),
        };
        Some(command)
    }

    /// Bytes written to the server for this command, if it has any.
    pub fn wire_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Command::Exit => Some(EXIT_NOTICE.to_vec()),
            Command::ListPeers => Some(LIST_REQUEST.to_vec()),
            Command::SendDirect { recipient, body } => {
                Some(format!("send {} {}", recipient, body).into_bytes())
            }
            Command::Invalid { .. } => None,
        }
    }
}

// `send <recipient> <body...>`: only the first two spaces delimit.
fn parse_send(line: &str) -> Option<Command> {
    let rest = line.strip_prefix("send ")?;
    let (recipient, body) = rest.split_once(' ')?;
    if recipient.is_empty() || body.is_empty() {
        return None;
    }
    Some(Command::SendDirect {
        recipient: recipient.to_string(),
        body: body.to_string(),
    })
}

fn invalid(line: &str) -> Command {
    Command::Invalid {
        raw_input: line.to_string(),
    }
}

pub fn registration(name: &str) -> Vec<u8> {
    format!("register username {}", name).into_bytes()
}
