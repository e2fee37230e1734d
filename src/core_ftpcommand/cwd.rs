use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the CWD (Change Working Directory) FTP command.
///
/// The target must exist and be a directory; on failure the working
/// directory is left untouched.
pub async fn handle_cwd_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let path = session.resolve_path(&arg);

    match session.storage.entry(&path).await {
        Ok(Some(entry)) if entry.is_dir => {
            info!("[{}] Changed directory to {}", session.id, path);
            session.cwd = path;
            session
                .send_response("250 Directory successfully changed.")
                .await?;
        }
        _ => {
            warn!("[{}] CWD to {} refused", session.id, path);
            session
                .send_response("550 Failed to change directory.")
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core_storage::StorageBackend;
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn cwd_moves_into_existing_directory() {
        let (mut session, _client) = test_session().await;
        session.storage.create_dir("/docs").await.unwrap();
        super::handle_cwd_command(&mut session, "docs".to_string())
            .await
            .unwrap();
        assert_eq!(session.cwd, "/docs");
    }

    #[tokio::test]
    async fn cwd_to_missing_path_keeps_cwd() {
        let (mut session, _client) = test_session().await;
        super::handle_cwd_command(&mut session, "missing".to_string())
            .await
            .unwrap();
        assert_eq!(session.cwd, "/");
    }
}
