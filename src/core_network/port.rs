use crate::core_error::FtpError;
use crate::session::Session;
use log::{info, warn};
use std::net::{IpAddr, SocketAddr};

/// Parses the classic PORT argument: six comma-separated octets, four for
/// the IPv4 address and two encoding the port.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let parts: Vec<&str> = arg.trim().split(',').collect();
    if parts.len() != 6 {
        return None;
    }
    let octets: Vec<u8> = parts
        .iter()
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    let ip = IpAddr::from([octets[0], octets[1], octets[2], octets[3]]);
    let port = ((octets[4] as u16) << 8) | octets[5] as u16;
    Some(SocketAddr::new(ip, port))
}

/// Parses the EPRT argument: `<d>af<d>addr<d>port<d>` where `<d>` is the
/// first character of the argument and `af` is 1 (IPv4) or 2 (IPv6). The
/// address family must match the parsed address.
pub fn parse_eprt_argument(arg: &str) -> Option<SocketAddr> {
    let arg = arg.trim();
    let delimiter = arg.chars().next()?;
    let mut fields = arg[delimiter.len_utf8()..].split(delimiter);

    let family: u8 = fields.next()?.parse().ok()?;
    let ip: IpAddr = fields.next()?.parse().ok()?;
    let port: u16 = fields.next()?.parse().ok()?;

    let family_matches = match ip {
        IpAddr::V4(_) => family == 1,
        IpAddr::V6(_) => family == 2,
    };
    if !family_matches {
        return None;
    }
    Some(SocketAddr::new(ip, port))
}

/// Handles the PORT (Active Mode) FTP command, recording the endpoint the
/// server will dial out to for the next transfer.
pub async fn handle_port_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    match parse_port_argument(&arg) {
        Some(addr) => {
            info!("[{}] Active endpoint set to {}", session.id, addr);
            session.active_endpoint = Some(addr);
            session.send_response("200 PORT command successful.").await?;
        }
        None => {
            warn!("[{}] Malformed PORT argument: {}", session.id, arg);
            session
                .send_response("501 Syntax error in parameters or arguments.")
                .await?;
        }
    }
    Ok(())
}

/// Handles the EPRT (Extended Active Mode) FTP command.
pub async fn handle_eprt_command(session: &mut Session, arg: String) -> Result<(), FtpError> {
    match parse_eprt_argument(&arg) {
        Some(addr) => {
            info!("[{}] Active endpoint set to {}", session.id, addr);
            session.active_endpoint = Some(addr);
            session.send_response("200 EPRT command successful.").await?;
        }
        None => {
            warn!("[{}] Malformed EPRT argument: {}", session.id, arg);
            session
                .send_response("501 Syntax error in parameters or arguments.")
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_argument_parses_octets() {
        let addr = parse_port_argument("127,0,0,1,24,133").unwrap();
        assert_eq!(addr, "127.0.0.1:6277".parse().unwrap());
    }

    #[test]
    fn port_argument_rejects_bad_shapes() {
        assert!(parse_port_argument("127,0,0,1,24").is_none());
        assert!(parse_port_argument("300,0,0,1,24,133").is_none());
        assert!(parse_port_argument("a,b,c,d,e,f").is_none());
    }

    #[test]
    fn eprt_argument_parses_ipv4_and_ipv6() {
        let v4 = parse_eprt_argument("|1|132.235.1.2|6275|").unwrap();
        assert_eq!(v4, "132.235.1.2:6275".parse().unwrap());

        let v6 = parse_eprt_argument("|2|::1|6275|").unwrap();
        assert_eq!(v6, "[::1]:6275".parse().unwrap());
    }

    #[test]
    fn eprt_honors_custom_delimiters() {
        let addr = parse_eprt_argument("!1!10.0.0.5!2048!").unwrap();
        assert_eq!(addr, "10.0.0.5:2048".parse().unwrap());
    }

    #[test]
    fn eprt_rejects_family_mismatch() {
        assert!(parse_eprt_argument("|2|132.235.1.2|6275|").is_none());
        assert!(parse_eprt_argument("|1|::1|6275|").is_none());
        assert!(parse_eprt_argument("|3|132.235.1.2|6275|").is_none());
    }

    #[test]
    fn eprt_rejects_garbage() {
        assert!(parse_eprt_argument("").is_none());
        assert!(parse_eprt_argument("|1|not-an-ip|x|").is_none());
    }
}
