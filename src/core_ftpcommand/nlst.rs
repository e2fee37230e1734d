use crate::core_error::FtpError;
use crate::session::Session;
use log::warn;
use tokio::io::AsyncWriteExt;

/// Handles the NLST FTP command, streaming bare entry names over the data
/// connection.
pub async fn handle_nlst_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if !session.is_authenticated {
        let response = FtpError::Auth.to_ftp_response();
        session.send_response(&response).await?;
        return Ok(());
    }

    let path = session.resolve_path(&arg);
    let entries = match session.storage.list_dir(&path).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("[{}] NLST of {} failed: {}", session.id, path, e);
            session
                .send_response("550 Failed to list directory.")
                .await?;
            return Ok(());
        }
    };

    session
        .send_response("150 Opening ASCII mode data connection for file list.")
        .await?;
    let mut data = match session.open_data_stream().await {
        Ok(stream) => stream,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!("[{}] Data connection failed: {}", session.id, e);
            session
                .send_response("425 Can't open data connection.")
                .await?;
            return Ok(());
        }
    };

    let send = async {
        for entry in &entries {
            data.write_all(entry.name.as_bytes()).await?;
            data.write_all(b"\r\n").await?;
        }
        data.shutdown().await?;
        Ok::<(), std::io::Error>(())
    };

    match send.await {
        Ok(()) => {
            session.send_response("226 Transfer complete.").await?;
        }
        Err(e) => {
            warn!("[{}] NLST transfer aborted: {}", session.id, e);
            session
                .send_response("425 Data connection failed; transfer aborted.")
                .await?;
        }
    }
    Ok(())
}
