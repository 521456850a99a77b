//! # Connection Handler

use crate::cmd;
use crate::constants::BUFFER_LEN;
use crate::errors::ConnectionError;
use crate::resp;
use crate::store::DataStore;
use bytes::Bytes;
use log::{trace, warn};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Handles every successive request on a single connection.
///
/// Since a single request is always an array, it can contain multiple commands. This is
/// called [pipelining](https://redis.io/docs/latest/develop/reference/protocol-spec/#multiple-commands-and-pipelining):
/// a client can write several commands in one syscall without waiting for replies in between,
/// and read every reply back afterwards. Supporting it is just a matter of draining every
/// complete frame the decoder can find in the buffer before going back to the socket for more;
/// a command spanning more than one `read()` just means the decoder returns `NeedMore` and the
/// loop goes around for another read.
///
/// The handler owns no shared mutable state beyond `store`, a reference to the one
/// [`DataStore`] every connection and the sweeper share.
pub async fn handle_connection(store: Arc<DataStore>, stream: &mut TcpStream) -> Result<(), ConnectionError> {
    let peer_addr = stream.peer_addr()?;
    trace!("start handling requests from {peer_addr}");

    let mut buf: Vec<u8> = Vec::with_capacity(BUFFER_LEN);
    let mut read_buf = [0u8; BUFFER_LEN];

    loop {
        let n = stream.read(&mut read_buf).await?;
        if n == 0 {
            if !buf.is_empty() {
                warn!("{peer_addr} closed mid-frame with {} buffered bytes", buf.len());
                return Err(ConnectionError::TruncatedAtEof);
            }
            break;
        }
        buf.extend_from_slice(&read_buf[..n]);

        loop {
            let view = Bytes::copy_from_slice(&buf);
            match resp::extract_frame(&view) {
                Ok(Some((frame, consumed))) => {
                    buf.drain(..consumed);
                    let reply = cmd::dispatch(&store, frame);
                    stream.write_all(&resp::encode(&reply)).await?;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("malformed frame from {peer_addr}: {e}");
                    return Err(ConnectionError::from(crate::errors::CmdError::from(e)));
                }
            }
        }
        stream.flush().await?;
    }

    trace!("stop handling requests from {peer_addr}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOCAL_SOCKET_ADDR_STR_TEST;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn pipelined_pings_are_answered_in_order() {
        let listener = TcpListener::bind(LOCAL_SOCKET_ADDR_STR_TEST).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r\nPING\r\n")
            .await
            .unwrap();

        let (mut server_side, _) = listener.accept().await.unwrap();
        let store = Arc::new(DataStore::new());
        tokio::spawn(async move {
            let _ = handle_connection(store, &mut server_side).await;
        });

        let mut rdbuf = [0u8; 14];
        let n = client.read(&mut rdbuf).await.unwrap();
        assert_eq!(&rdbuf[..n], b"+PONG\r\n+PONG\r\n");
    }

    #[tokio::test]
    async fn request_split_across_two_reads_is_still_decoded() {
        let listener = TcpListener::bind(LOCAL_SOCKET_ADDR_STR_TEST).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (mut server_side, _) = listener.accept().await.unwrap();
        let store = Arc::new(DataStore::new());
        tokio::spawn(async move {
            let _ = handle_connection(store, &mut server_side).await;
        });

        client.write_all(b"*3\r\n$3\r\nSET\r\n$1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        client.write_all(b"\r\nk\r\n$1\r\nv\r\n").await.unwrap();

        let mut rdbuf = [0u8; 5];
        let n = client.read(&mut rdbuf).await.unwrap();
        assert_eq!(&rdbuf[..n], b"+OK\r\n");
    }
}
