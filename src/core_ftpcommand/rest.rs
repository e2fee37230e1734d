use crate::core_error::FtpError;
use crate::session::Session;
use log::info;

/// Handles the REST FTP command, arming the restart offset consumed by the
/// next RETR, STOR or APPE.
pub async fn handle_rest_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    match arg.trim().parse::<u64>() {
        Ok(offset) => {
            info!("[{}] Restart offset set to {}", session.id, offset);
            session.restart_offset = offset;
            session
                .send_response(&format!(
                    "350 Restarting at {}. Send STORE or RETRIEVE to initiate transfer.",
                    offset
                ))
                .await?;
        }
        Err(_) => {
            let response =
                FtpError::Syntax(format!("REST offset must be a non-negative integer: {}", arg))
                    .to_ftp_response();
            session.send_response(&response).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn rest_sets_offset() {
        let (mut session, _client) = test_session().await;
        super::handle_rest_command(&mut session, "42".to_string())
            .await
            .unwrap();
        assert_eq!(session.restart_offset, 42);
    }

    #[tokio::test]
    async fn non_numeric_offset_is_a_syntax_error() {
        let (mut session, _client) = test_session().await;
        super::handle_rest_command(&mut session, "abc".to_string())
            .await
            .unwrap();
        assert_eq!(session.restart_offset, 0);
    }
}
