use crate::core_error::FtpError;
use crate::session::{DataProtection, Session};
use log::info;

/// Handles the PROT FTP command, choosing whether data connections are
/// cleartext (C) or wrapped in TLS (P).
pub async fn handle_prot_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let level = arg.trim().to_ascii_uppercase();
    let response = match level.as_str() {
        "C" => {
            session.data_protection = DataProtection::Clear;
            "200 Protection level set to C."
        }
        "P" if session.certificates.is_enabled() => {
            session.data_protection = DataProtection::Private;
            "200 Protection level set to P."
        }
        _ => "504 Command not implemented for that parameter.",
    };
    if level == "P" && session.data_protection == DataProtection::Private {
        info!("[{}] Data channel protection set to private", session.id);
    }
    session.send_response(response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::{DataProtection, tests::test_session};

    #[tokio::test]
    async fn prot_c_always_succeeds() {
        let (mut session, _client) = test_session().await;
        super::handle_prot_command(&mut session, "c".to_string())
            .await
            .unwrap();
        assert_eq!(session.data_protection, DataProtection::Clear);
    }

    #[tokio::test]
    async fn prot_p_requires_tls_support() {
        let (mut session, _client) = test_session().await;
        super::handle_prot_command(&mut session, "P".to_string())
            .await
            .unwrap();
        assert_eq!(session.data_protection, DataProtection::Clear);
    }
}
