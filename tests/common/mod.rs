//! In-process stand-in for an Aquos TV's IP control service.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use aquos_rc::ClientConfig;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

/// One step of a scripted conversation.
#[derive(Debug, Clone)]
pub enum Step {
    /// Write raw bytes to the client.
    Send(&'static str),
    /// Read one `\r`-terminated line from the client and record it.
    Receive,
    /// Hang up without waiting for the client.
    Close,
}

/// What the device saw on one connection.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Lines received by `Step::Receive`, terminator stripped.
    pub lines: Vec<String>,
    /// Bytes the client sent after the script finished.
    pub trailing: Vec<u8>,
    /// True if the client closed the connection after the script.
    pub closed_by_client: bool,
}

/// Login handshake that accepts the credentials.
pub fn login() -> Vec<Step> {
    vec![
        Step::Send("Login:"),
        Step::Receive,
        Step::Send("\r\nPassword:"),
        Step::Receive,
        Step::Send("\r\n"),
    ]
}

/// Login handshake followed by one command and `reply`.
pub fn command(reply: &'static str) -> Vec<Step> {
    let mut steps = login();
    steps.push(Step::Receive);
    steps.push(Step::Send(reply));
    steps
}

pub struct MockDevice {
    port: u16,
    handle: thread::JoinHandle<Vec<Transcript>>,
}

impl MockDevice {
    /// Serves `scripts.len()` connections, one script each, in order.
    pub fn start(scripts: Vec<Vec<Step>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            scripts
                .into_iter()
                .map(|script| {
                    let (stream, _) = listener.accept().unwrap();
                    run_script(stream, script)
                })
                .collect::<Vec<_>>()
        });
        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("127.0.0.1", self.port, USERNAME, PASSWORD)
            .with_timeout(Duration::from_millis(500))
    }

    /// Waits for every scripted connection to finish.
    pub fn finish(self) -> Vec<Transcript> {
        self.handle.join().unwrap()
    }
}

fn run_script(stream: TcpStream, script: Vec<Step>) -> Transcript {
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;
    let mut transcript = Transcript::default();

    for step in script {
        match step {
            Step::Send(text) => {
                // The client may already have given up; keep recording.
                let _ = writer.write_all(text.as_bytes());
            }
            Step::Receive => {
                let mut line = Vec::new();
                if reader.read_until(b'\r', &mut line).unwrap_or(0) == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&line);
                transcript.lines.push(line.trim_end_matches('\r').to_string());
            }
            Step::Close => {
                let _ = writer.shutdown(Shutdown::Both);
                return transcript;
            }
        }
    }

    let mut trailing = Vec::new();
    // A reset also means the client is gone; only a read timeout means it lingered.
    transcript.closed_by_client = match reader.read_to_end(&mut trailing) {
        Ok(_) => true,
        Err(e) => e.kind() == std::io::ErrorKind::ConnectionReset,
    };
    transcript.trailing = trailing;
    transcript
}
