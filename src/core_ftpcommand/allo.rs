use crate::core_error::FtpError;
use crate::session::Session;

/// Handles the ALLO FTP command. Storage is not preallocated, so this is
/// always a no-op acknowledgment.
pub async fn handle_allo_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    session
        .send_response("202 Command not implemented, superfluous at this site.")
        .await?;
    Ok(())
}
