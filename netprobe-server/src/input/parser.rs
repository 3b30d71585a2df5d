//! Command parser for the slash-command protocol.
//!
//! Examples:
//!   "/ping example.org"          -> Command::Ping { host: "example.org" }
//!   "/PORT 10.0.0.1 20 25"       -> Command::Port { start: 20, end: 25, num_requests: None }
//!   "/res_time 10.0.0.1 22 3"    -> Command::ResTime { port: 22, num_requests: Some(3) }
//!   "/get user4"                 -> Command::Get { id: "user4" }
//!   "hello"                      -> Command::Help
//!
//! Arity and number problems come back as a `CommandError` whose message is
//! meant to be sent to the client verbatim.

use crate::hardening::MAX_NUM_REQUESTS;
use netprobe_core::{UserId, UserRecord};
use thiserror::Error;

pub const PING_USAGE: &str = "Usage: /ping <hostname/IP>";
pub const PORT_USAGE: &str = "Usage: /port <hostname/IP> <start_port> <end_port> <#num_requests>";
pub const RES_TIME_USAGE: &str = "Usage: /res_time <hostname/IP> <port> <#num_requests>";
pub const GET_USAGE: &str = "Usage: /GET <user_ID>";
pub const POST_USAGE: &str = "Usage: /POST <user_name> <user_age>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Ping {
        host: String,
    },
    Port {
        ip: String,
        start: u16,
        end: u16,
        num_requests: Option<u32>,
    },
    ResTime {
        ip: String,
        port: u16,
        num_requests: Option<u32>,
    },
    Get {
        id: UserId,
    },
    Post {
        name: String,
        age: i64,
    },
}

impl Command {
    pub fn as_str(&self) -> &str {
        match self {
            Command::Exit => "/exit",
            Command::Help => "/help",
            Command::Ping { .. } => "/ping",
            Command::Port { .. } => "/port",
            Command::ResTime { .. } => "/res_time",
            Command::Get { .. } => "/get",
            Command::Post { .. } => "/post",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Wrong number of parameters.
    #[error("{0}")]
    Usage(&'static str),

    #[error("error: {value:?} is not a valid {what}\n{usage}")]
    InvalidNumber {
        what: &'static str,
        value: String,
        usage: &'static str,
    },

    #[error("error: start port {start} is above end port {end}\n{usage}")]
    InvalidRange { start: u16, end: u16, usage: &'static str },
}

pub type ParseResult = Result<Command, CommandError>;

pub fn parse_command(input: &str) -> ParseResult {
    let mut tokens = input.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(Command::Help);
    };
    let params: Vec<&str> = tokens.collect();

    match head.to_ascii_lowercase().as_str() {
        "/exit" => Ok(Command::Exit),
        "/ping" => match params.as_slice() {
            [host] => Ok(Command::Ping { host: host.to_string() }),
            _ => Err(CommandError::Usage(PING_USAGE)),
        },
        "/port" => parse_port(&params),
        "/res_time" => parse_res_time(&params),
        "/get" => match params.as_slice() {
            [id] => Ok(Command::Get { id: UserId::parse(id) }),
            _ => Err(CommandError::Usage(GET_USAGE)),
        },
        "/post" => match params.as_slice() {
            [name, age] => {
                let age = UserRecord::parse_age(age).map_err(|_| CommandError::InvalidNumber {
                    what: "age",
                    value: age.to_string(),
                    usage: POST_USAGE,
                })?;
                Ok(Command::Post { name: name.to_string(), age })
            }
            _ => Err(CommandError::Usage(POST_USAGE)),
        },
        _ => Ok(Command::Help),
    }
}

fn parse_port(params: &[&str]) -> ParseResult {
    let (ip, start, end, count) = match params {
        [ip, start, end] => (ip, start, end, None),
        [ip, start, end, count] => (ip, start, end, Some(count)),
        _ => return Err(CommandError::Usage(PORT_USAGE)),
    };

    let start = port_number(start, "start port", PORT_USAGE)?;
    let end = port_number(end, "end port", PORT_USAGE)?;
    if start > end {
        return Err(CommandError::InvalidRange { start, end, usage: PORT_USAGE });
    }
    let num_requests = count.map(|c| request_count(c, PORT_USAGE)).transpose()?;

    Ok(Command::Port { ip: ip.to_string(), start, end, num_requests })
}

fn parse_res_time(params: &[&str]) -> ParseResult {
    let (ip, port, count) = match params {
        [ip, port] => (ip, port, None),
        [ip, port, count] => (ip, port, Some(count)),
        _ => return Err(CommandError::Usage(RES_TIME_USAGE)),
    };

    let port = port_number(port, "port", RES_TIME_USAGE)?;
    let num_requests = count.map(|c| request_count(c, RES_TIME_USAGE)).transpose()?;

    Ok(Command::ResTime { ip: ip.to_string(), port, num_requests })
}

fn port_number(s: &str, what: &'static str, usage: &'static str) -> Result<u16, CommandError> {
    match s.parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(CommandError::InvalidNumber { what, value: s.to_string(), usage }),
    }
}

fn request_count(s: &str, usage: &'static str) -> Result<u32, CommandError> {
    match s.parse::<u32>() {
        Ok(n) if (1..=MAX_NUM_REQUESTS).contains(&n) => Ok(n),
        _ => Err(CommandError::InvalidNumber { what: "request count", value: s.to_string(), usage }),
    }
}
