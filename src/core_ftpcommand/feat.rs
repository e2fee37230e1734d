use crate::core_error::FtpError;
use crate::session::Session;

/// Handles the FEAT (Feature) FTP command.
///
/// Responds with the capability list as a 211 multi-line reply.
pub async fn handle_feat_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    let mut features = vec!["SIZE", "REST STREAM", "EPSV", "EPRT"];
    if session.certificates.is_enabled() {
        features.push("AUTH TLS");
        features.push("PBSZ");
        features.push("PROT");
    }

    session.send_response("211-Features:").await?;
    for feature in features {
        session.send_response(&format!(" {}", feature)).await?;
    }
    session.send_response("211 End").await?;
    Ok(())
}
