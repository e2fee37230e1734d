use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;

/// Handles the HELP FTP command with the recognized verb list as a 214
/// multi-line reply.
pub async fn handle_help_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    session
        .send_response("214-The following commands are recognized.")
        .await?;
    for chunk in FtpCommand::all_names().chunks(8) {
        session.send_response(&format!(" {}", chunk.join(" "))).await?;
    }
    session.send_response("214 Help OK.").await?;
    Ok(())
}
