use crate::core_error::FtpError;
use crate::core_ftpcommand::utils::quote_path;
use crate::session::Session;

pub async fn handle_pwd_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    let response = format!("257 {} is the current directory.", quote_path(&session.cwd));
    session.send_response(&response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn pwd_reports_quoted_cwd() {
        let (mut session, mut client) = test_session().await;
        session.cwd = String::from("/docs");
        super::handle_pwd_command(&mut session, String::new())
            .await
            .unwrap();

        let mut buf = vec![0u8; 128];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(
            String::from_utf8_lossy(&buf[..n]),
            "257 \"/docs\" is the current directory.\r\n"
        );
    }
}
