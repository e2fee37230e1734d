use crate::core_error::FtpError;
use crate::session::Session;

/// Handles the MODE FTP command; only stream mode is supported.
pub async fn handle_mode_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    let response = if arg.trim().eq_ignore_ascii_case("S") {
        "200 Mode set to S."
    } else {
        "504 Command not implemented for that parameter."
    };
    session.send_response(response).await?;
    Ok(())
}
