use crate::core_error::FtpError;
use crate::core_storage::parent_path;
use crate::session::Session;

/// Handles the CDUP FTP command. The root is its own parent.
pub async fn handle_cdup_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    session.cwd = parent_path(&session.cwd).to_string();
    session.send_response("200 Command okay.").await?;
    Ok(())
}
