use crate::constants::SYST_ID;
use crate::core_error::FtpError;
use crate::session::Session;

pub async fn handle_syst_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    session.send_response(SYST_ID).await?;
    Ok(())
}
