use crate::core_error::FtpError;
use crate::session::Session;
use log::{debug, warn};

/// Handles the PASV command: leases a fresh passive listener and advertises
/// it as the classic comma-separated (ip,p1,p2) tuple.
///
/// Pool exhaustion is answered with a clean 425 instead of tearing the
/// session down; the client may retry or fall back to active mode.
pub async fn handle_pasv_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    match session.enter_passive_mode().await {
        Ok((ip, port)) => {
            let octets = ip.octets();
            let response = format!(
                "227 Entering Passive Mode ({},{},{},{},{},{}).",
                octets[0],
                octets[1],
                octets[2],
                octets[3],
                port / 256,
                port % 256
            );
            debug!("[{}] PASV listener on {}:{}", session.id, ip, port);
            session.send_response(&response).await?;
        }
        Err(FtpError::ResourceExhausted) => {
            warn!("[{}] Passive port range exhausted", session.id);
            session
                .send_response("425 Can't open data connection; no passive port available.")
                .await?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Handles the EPSV command; same negotiation as PASV with the extended
/// bare-port reply format.
pub async fn handle_epsv_command(session: &mut Session, _arg: String) -> Result<(), FtpError> {
    match session.enter_passive_mode().await {
        Ok((_ip, port)) => {
            let response = format!("229 Entering Extended Passive Mode (|||{}|)", port);
            session.send_response(&response).await?;
        }
        Err(FtpError::ResourceExhausted) => {
            warn!("[{}] Passive port range exhausted", session.id);
            session
                .send_response("425 Can't open data connection; no passive port available.")
                .await?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::session::tests::test_session;
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    async fn read_reply(client: &mut tokio::net::TcpStream) -> String {
        let mut buf = vec![0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    fn narrow_range(session: &mut crate::session::Session, start: u16, end: u16) {
        let mut config = crate::config::Config::default();
        config.server.pasv_port_start = start;
        config.server.pasv_port_end = end;
        session.config = Arc::new(config);
    }

    #[tokio::test]
    async fn pasv_advertises_a_port_inside_the_range() {
        let (mut session, mut client) = test_session().await;
        narrow_range(&mut session, 51600, 51610);

        super::handle_pasv_command(&mut session, String::new())
            .await
            .unwrap();
        let reply = read_reply(&mut client).await;
        assert!(reply.starts_with("227 Entering Passive Mode ("));

        let inside = reply
            .trim()
            .trim_start_matches("227 Entering Passive Mode (")
            .trim_end_matches(").");
        let fields: Vec<u16> = inside.split(',').map(|f| f.parse().unwrap()).collect();
        let port = fields[4] * 256 + fields[5];
        assert!((51600..=51610).contains(&port));
    }

    #[tokio::test]
    async fn epsv_advertises_the_bare_port() {
        let (mut session, mut client) = test_session().await;
        narrow_range(&mut session, 51620, 51630);

        super::handle_epsv_command(&mut session, String::new())
            .await
            .unwrap();
        let reply = read_reply(&mut client).await;
        assert!(reply.starts_with("229 Entering Extended Passive Mode (|||"));
        let port: u16 = reply
            .trim()
            .trim_start_matches("229 Entering Extended Passive Mode (|||")
            .trim_end_matches("|)")
            .parse()
            .unwrap();
        assert!((51620..=51630).contains(&port));
    }

    #[tokio::test]
    async fn exhausted_range_gets_a_clean_425() {
        let (mut session, mut client) = test_session().await;
        let (mut other, _other_client) = test_session().await;
        narrow_range(&mut session, 51640, 51640);
        narrow_range(&mut other, 51640, 51640);

        super::handle_pasv_command(&mut other, String::new())
            .await
            .unwrap();
        super::handle_pasv_command(&mut session, String::new())
            .await
            .unwrap();
        let reply = read_reply(&mut client).await;
        assert!(reply.starts_with("425"));
        assert!(!session.should_quit);
    }
}
