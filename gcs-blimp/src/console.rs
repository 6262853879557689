use blimp_internal::command::{parse_line, Command};
use log::debug;
use tokio::io::{self, AsyncBufReadExt, BufReader};

/// Forwards every valid stdin line as a [Command] until stdin closes or nobody is listening.
/// Lines that do not tokenize are reported and never sent
pub async fn read_commands(tx: flume::Sender<Command>) -> io::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line.as_bytes()) {
            Ok(command) => {
                debug!("Sending command: {}", command);
                if tx.send_async(command).await.is_err() {
                    break;
                }
            }
            Err(e) => println!("Invalid command {:?}: {:?}", line, e),
        }
    }
    Ok(())
}
