use crate::core_error::FtpError;
use crate::session::{DataProtection, Session, TransferType};

/// Handles the STAT FTP command, reporting session state on the control
/// channel as a 211 multi-line reply.
pub async fn handle_stat_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    let connected = format!(" Connected from {}", session.peer_addr());
    let login = match (session.is_authenticated, &session.pending_user) {
        (true, _) => String::from(" Logged in"),
        (false, Some(user)) => format!(" Awaiting password for {}", user),
        (false, None) => String::from(" Not logged in"),
    };
    let transfer_type = match session.transfer_type {
        TransferType::Binary => " TYPE: Image",
        TransferType::Ascii => " TYPE: ASCII",
    };
    let protection = match session.data_protection {
        DataProtection::Clear => " Data protection: clear",
        DataProtection::Private => " Data protection: private",
    };

    session
        .send_response("211-Status of ferroftpd server")
        .await?;
    session.send_response(&connected).await?;
    session.send_response(&login).await?;
    session.send_response(transfer_type).await?;
    session.send_response(protection).await?;
    session
        .send_response(&format!(" Working directory: {}", session.cwd))
        .await?;
    session.send_response("211 End of status").await?;
    Ok(())
}
