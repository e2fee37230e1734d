use crate::core_error::FtpError;
use crate::session::Session;
use log::info;

pub async fn handle_quit_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    info!("[{}] Client quit", session.id);
    session.send_response("221 Goodbye.").await?;
    session.should_quit = true;
    Ok(())
}
