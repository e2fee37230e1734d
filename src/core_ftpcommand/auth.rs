use crate::core_error::FtpError;
use crate::core_tls::TlsError;
use crate::session::Session;
use log::{info, warn};

/// Handles the AUTH FTP command.
///
/// Only AUTH TLS is supported. The 234 reply goes out in plaintext; the
/// control loop performs the actual stream swap once the handler returns,
/// so the flag here is the session-local upgrade trigger.
pub async fn handle_auth_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    if !arg.trim().eq_ignore_ascii_case("TLS") {
        session
            .send_response("504 Command not implemented for that parameter.")
            .await?;
        return Ok(());
    }

    if !session.certificates.is_enabled() {
        warn!("[{}] AUTH TLS requested but TLS is disabled", session.id);
        let response = TlsError::TlsNotConfigured.to_ftp_response();
        session.send_response(&response).await?;
        return Ok(());
    }

    if session.is_control_tls {
        session
            .send_response("503 Control channel is already secured.")
            .await?;
        return Ok(());
    }

    info!("[{}] Control channel TLS upgrade requested", session.id);
    session.upgrade_requested = true;
    session
        .send_response("234 Proceed with negotiation.")
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn auth_with_unknown_mechanism_is_refused() {
        let (mut session, _client) = test_session().await;
        super::handle_auth_command(&mut session, "SSL".to_string())
            .await
            .unwrap();
        assert!(!session.upgrade_requested);
    }

    #[tokio::test]
    async fn auth_tls_without_tls_support_is_refused() {
        let (mut session, _client) = test_session().await;
        super::handle_auth_command(&mut session, "TLS".to_string())
            .await
            .unwrap();
        assert!(!session.upgrade_requested);
    }
}
