use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the RMD (Remove Directory) FTP command.
///
/// The target must exist, be a directory, and be empty.
pub async fn handle_rmd_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.entry(&path).await {
        Ok(Some(entry)) if entry.is_dir => {}
        Ok(Some(_)) => {
            warn!("[{}] RMD target is not a directory: {}", session.id, path);
            session.send_response("550 Not a directory.").await?;
            return Ok(());
        }
        _ => {
            session
                .send_response("550 Directory does not exist.")
                .await?;
            return Ok(());
        }
    }

    let _guard = session.locks.acquire_write(&path).await;
    match session.storage.delete(&path, false).await {
        Ok(()) => {
            info!("[{}] Directory removed: {}", session.id, path);
            session
                .send_response("250 Directory successfully removed.")
                .await?;
        }
        Err(e) => {
            warn!("[{}] RMD failed for {}: {}", session.id, path, e);
            session
                .send_response("550 Failed to remove directory.")
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core_storage::{StorageBackend, WriteMode};
    use crate::session::tests::test_session;
    use std::io::Cursor;

    #[tokio::test]
    async fn rmd_removes_empty_directory() {
        let (mut session, _client) = test_session().await;
        session.storage.create_dir("/docs").await.unwrap();
        super::handle_rmd_command(&mut session, "docs".to_string())
            .await
            .unwrap();
        assert!(!session.storage.exists("/docs").await.unwrap());
    }

    #[tokio::test]
    async fn rmd_keeps_non_empty_directory() {
        let (mut session, _client) = test_session().await;
        session.storage.create_dir("/docs").await.unwrap();
        let mut reader = Cursor::new(b"x".to_vec());
        session
            .storage
            .write("/docs/f.txt", &mut reader, WriteMode::Truncate)
            .await
            .unwrap();
        super::handle_rmd_command(&mut session, "docs".to_string())
            .await
            .unwrap();
        assert!(session.storage.exists("/docs").await.unwrap());
    }
}
