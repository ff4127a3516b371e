//! Upstream relay
//!
//! Pumps the upstream side of an exchange to the client, handing every chunk
//! to the exchange's hooks on the way. The streams are supplied by the host
//! proxy; nothing here opens a connection.

use crate::proxy::hooks::ProxyHooks;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_BUFFER_BYTES: usize = 8192;

/// Copy `upstream` to `client` until EOF, routing each chunk through `hooks`.
///
/// Returns the number of bytes forwarded. `on_upstream_connection_close` is
/// invoked once the relay stops, whether at EOF or on an I/O error.
pub async fn relay_upstream<R, W, H>(
    upstream: &mut R,
    client: &mut W,
    hooks: &mut H,
) -> anyhow::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    H: ProxyHooks + ?Sized,
{
    let result = pump(upstream, client, hooks).await;
    hooks.on_upstream_connection_close();
    match &result {
        Ok(forwarded) => tracing::debug!("Upstream closed after {} bytes", forwarded),
        Err(err) => tracing::debug!("Upstream relay stopped: {err}"),
    }
    Ok(result?)
}

async fn pump<R, W, H>(upstream: &mut R, client: &mut W, hooks: &mut H) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    H: ProxyHooks + ?Sized,
{
    let mut temp = vec![0u8; READ_BUFFER_BYTES];
    let mut forwarded = 0u64;

    loop {
        let bytes_read = upstream.read(&mut temp).await?;
        if bytes_read == 0 {
            break;
        }

        let chunk = hooks.handle_upstream_chunk(Bytes::copy_from_slice(&temp[..bytes_read]));
        client.write_all(&chunk).await?;
        forwarded += chunk.len() as u64;
    }

    client.flush().await?;
    Ok(forwarded)
}
