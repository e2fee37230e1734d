use crate::core_error::FtpError;
use crate::session::Session;

pub async fn handle_noop_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    session.send_response("200 NOOP command successful.").await?;
    Ok(())
}
