use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};

/// Handles the PASS FTP command.
///
/// Requires a preceding USER; consults the configured authenticator and
/// flips the session's authentication flag on success.
pub async fn handle_pass_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let username = match session.pending_user.take() {
        Some(username) => username,
        None => {
            warn!("[{}] PASS without a pending USER", session.id);
            let response = FtpError::Sequence.to_ftp_response();
            session.send_response(&response).await?;
            return Ok(());
        }
    };

    let authenticator = session.authenticator.clone();
    let result = authenticator.authenticate(&username, arg.trim()).await;
    if result.succeeded {
        session.is_authenticated = true;
        info!("[{}] User {} logged in", session.id, username);
        session
            .send_response("230 User logged in, proceed.")
            .await?;
    } else {
        warn!(
            "[{}] Authentication failed for {}: {}",
            session.id,
            username,
            result.reason.as_deref().unwrap_or("no reason given")
        );
        session.send_response("530 Login incorrect.").await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn pass_without_user_is_a_sequence_error() {
        let (mut session, _client) = test_session().await;
        super::handle_pass_command(&mut session, "secret".to_string())
            .await
            .unwrap();
        assert!(!session.is_authenticated);
    }

    #[tokio::test]
    async fn anonymous_login_succeeds() {
        let (mut session, _client) = test_session().await;
        session.pending_user = Some("anonymous".to_string());
        super::handle_pass_command(&mut session, "me@example.com".to_string())
            .await
            .unwrap();
        assert!(session.is_authenticated);
        assert!(session.pending_user.is_none());
    }

    #[tokio::test]
    async fn rejected_credentials_leave_session_unauthenticated() {
        let (mut session, _client) = test_session().await;
        session.pending_user = Some("alice".to_string());
        super::handle_pass_command(&mut session, "secret".to_string())
            .await
            .unwrap();
        assert!(!session.is_authenticated);
    }
}
