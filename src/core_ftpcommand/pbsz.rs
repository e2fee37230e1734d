use crate::core_error::FtpError;
use crate::session::Session;

/// Handles the PBSZ FTP command. Stream-mode TLS needs no buffer, so only
/// size 0 is meaningful.
pub async fn handle_pbsz_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let response = if arg.trim() == "0" {
        "200 PBSZ set to 0."
    } else {
        "501 Syntax error in parameters or arguments."
    };
    session.send_response(response).await?;
    Ok(())
}
