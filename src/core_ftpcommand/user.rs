use crate::core_error::FtpError;
use crate::session::Session;
use log::info;

/// Handles the USER FTP command.
///
/// Re-entrant: a USER at any point restarts the handshake by replacing the
/// pending user name and asking for the password again.
pub async fn handle_user_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let username = arg.trim().to_string();
    info!("[{}] Received USER command for: {}", session.id, username);

    let response = if username.eq_ignore_ascii_case("anonymous") {
        "331 Anonymous login okay, send your complete email address as password."
    } else {
        "331 User name okay, need password."
    };

    session.pending_user = Some(username);
    session.send_response(response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn user_sets_pending_user() {
        let (mut session, _client) = test_session().await;
        super::handle_user_command(&mut session, "alice".to_string())
            .await
            .unwrap();
        assert_eq!(session.pending_user.as_deref(), Some("alice"));
        assert!(!session.is_authenticated);
    }

    #[tokio::test]
    async fn user_is_reentrant() {
        let (mut session, _client) = test_session().await;
        super::handle_user_command(&mut session, "alice".to_string())
            .await
            .unwrap();
        super::handle_user_command(&mut session, "bob".to_string())
            .await
            .unwrap();
        assert_eq!(session.pending_user.as_deref(), Some("bob"));
    }
}
