use crate::core_error::FtpError;
use crate::session::Session;

/// Handles the STRU FTP command; only file structure is supported.
pub async fn handle_stru_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let response = if arg.trim().eq_ignore_ascii_case("F") {
        "200 Structure set to F."
    } else {
        "504 Command not implemented for that parameter."
    };
    session.send_response(response).await?;
    Ok(())
}
