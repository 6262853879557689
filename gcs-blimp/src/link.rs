use std::{
    io::{self, Read, Write},
    thread,
    time::Duration,
};

use blimp_internal::command::Command;
use log::{error, info};
use serialport::SerialPort;

use crate::console;

/// How long a read blocks before the reader thread checks the port again
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Splits the byte stream coming from the blimp into lines
#[derive(Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Returns every line completed by `bytes`, without line endings
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' => {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
                b'\r' => {}
                _ => self.pending.push(byte),
            }
        }
        lines
    }
}

pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    pub fn open(path: &str, baud: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud).timeout(READ_TIMEOUT).open()?;
        info!("Opened {} at {} baud", path, baud);
        Ok(Self { port })
    }

    /// Starts a thread that forwards every line the blimp sends.
    /// It stops when the port fails or the receiver is dropped
    pub fn spawn_reader(&self) -> serialport::Result<flume::Receiver<String>> {
        let mut port = self.port.try_clone()?;
        let (tx, rx) = flume::unbounded();
        thread::spawn(move || {
            let mut lines = LineBuffer::default();
            let mut buf = [0u8; 256];
            loop {
                match port.read(&mut buf) {
                    Ok(n) => {
                        for line in lines.extend(&buf[..n]) {
                            if tx.send(line).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                    Err(e) => {
                        error!("Serial read failed: {}", e);
                        return;
                    }
                }
            }
        });
        Ok(rx)
    }

    /// Writes one command in wire form
    pub fn send(&mut self, command: &Command) -> io::Result<()> {
        self.port.write_all(format!("{}\n", command).as_bytes())?;
        self.port.flush()
    }
}

/// Relays stdin commands to the blimp on `path` and prints its answers until stdin closes
pub async fn run(path: &str, baud: u32) -> io::Result<()> {
    let mut link = SerialLink::open(path, baud)?;
    let responses = link.spawn_reader()?;
    tokio::spawn(async move {
        while let Ok(line) = responses.recv_async().await {
            println!("{}", line);
        }
    });

    let (tx, rx) = flume::unbounded::<Command>();
    let writer = thread::spawn(move || -> io::Result<()> {
        for command in rx.iter() {
            link.send(&command)?;
        }
        Ok(())
    });

    console::read_commands(tx).await?;
    match tokio::task::spawn_blocking(move || writer.join()).await {
        Ok(Ok(result)) => result,
        _ => Err(io::Error::new(io::ErrorKind::Other, "serial writer stopped unexpectedly")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_span_reads() {
        let mut lines = LineBuffer::default();
        assert!(lines.extend(b"Rog").is_empty());
        assert_eq!(lines.extend(b"er\r\nAlt: 4"), vec!["Roger"]);
        assert_eq!(lines.extend(b"8\nIR: None\n"), vec!["Alt: 48", "IR: None"]);
    }

    #[test]
    fn commands_go_out_in_wire_form() {
        let command = blimp_internal::command::parse_line(b"t f 100").unwrap();
        assert_eq!(format!("{}\n", command), "t f 100\n");
    }
}
