use crate::core_error::FtpError;
use crate::session::{Session, TransferType};

/// Handles the TYPE FTP command. Only Image (binary) and ASCII transfers
/// are supported; a trailing format token is accepted and ignored.
pub async fn handle_type_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let primary = arg
        .split_whitespace()
        .next()
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();

    let response = match primary.as_str() {
        "I" => {
            session.transfer_type = TransferType::Binary;
            "200 Type set to I.".to_string()
        }
        "A" => {
            session.transfer_type = TransferType::Ascii;
            "200 Type set to A.".to_string()
        }
        _ => FtpError::UnsupportedParameter(arg).to_ftp_response(),
    };
    session.send_response(&response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::test_session;

    #[tokio::test]
    async fn type_accepts_i_and_a_case_insensitively() {
        let (mut session, _client) = test_session().await;
        handle_type_command(&mut session, "a".to_string()).await.unwrap();
        assert_eq!(session.transfer_type, TransferType::Ascii);
        handle_type_command(&mut session, "I".to_string()).await.unwrap();
        assert_eq!(session.transfer_type, TransferType::Binary);
    }

    #[tokio::test]
    async fn type_accepts_trailing_format_token() {
        let (mut session, _client) = test_session().await;
        handle_type_command(&mut session, "A N".to_string())
            .await
            .unwrap();
        assert_eq!(session.transfer_type, TransferType::Ascii);
    }

    #[tokio::test]
    async fn unsupported_type_leaves_setting_unchanged() {
        let (mut session, _client) = test_session().await;
        handle_type_command(&mut session, "E".to_string()).await.unwrap();
        assert_eq!(session.transfer_type, TransferType::Binary);
    }
}
