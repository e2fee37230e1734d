use crate::constants::GREETING;
use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::dispatch_command;
use crate::core_ftpcommand::parser::parse_command_line;
use crate::core_network::stream::SecurableStream;
use crate::core_tls::TlsError;
use crate::session::{Session, SessionDeps};
use anyhow::Result;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

/// Binds the control listener(s) and accepts connections until a shutdown
/// signal arrives, then drains the outstanding session tasks.
pub async fn start_server(deps: SessionDeps, banner: Option<String>) -> Result<()> {
    let config = Arc::clone(&deps.config);
    let addr = format!(
        "{}:{}",
        config.server.listen_address, config.server.listen_port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let implicit_listener = if config.tls.enabled && config.tls.implicit_tls {
        let implicit_addr = format!(
            "{}:{}",
            config.server.listen_address, config.tls.implicit_tls_port
        );
        let listener = TcpListener::bind(&implicit_addr).await?;
        info!("Implicit TLS listener on {}", implicit_addr);
        Some(listener)
    } else {
        None
    };

    let active_sessions = Arc::new(AtomicUsize::new(0));
    let mut tasks: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping accept loop");
                break;
            }
            accepted = listener.accept() => {
                let (socket, addr) = accepted?;
                spawn_session(&mut tasks, socket, addr, false, &deps, &banner, &active_sessions);
            }
            accepted = accept_on(&implicit_listener), if implicit_listener.is_some() => {
                let (socket, addr) = accepted?;
                spawn_session(&mut tasks, socket, addr, true, &deps, &banner, &active_sessions);
            }
        }
        // Reap sessions that finished since the last accept.
        while tasks.try_join_next().is_some() {}
    }

    drop(listener);
    drop(implicit_listener);
    let remaining = active_sessions.load(Ordering::SeqCst);
    if remaining > 0 {
        info!("Waiting for {} active sessions to finish", remaining);
    }
    while tasks.join_next().await.is_some() {}
    Ok(())
}

async fn accept_on(listener: &Option<TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

fn spawn_session(
    tasks: &mut JoinSet<()>,
    socket: TcpStream,
    addr: SocketAddr,
    implicit_tls: bool,
    deps: &SessionDeps,
    banner: &Option<String>,
    active_sessions: &Arc<AtomicUsize>,
) {
    let max = deps.config.server.max_sessions;
    if max > 0 && active_sessions.load(Ordering::SeqCst) >= max {
        warn!(
            "Refusing connection from {}: session limit {} reached",
            addr, max
        );
        drop(socket);
        return;
    }

    active_sessions.fetch_add(1, Ordering::SeqCst);
    let deps = deps.clone();
    let banner = banner.clone();
    let counter = Arc::clone(active_sessions);
    tasks.spawn(async move {
        info!("New connection from {}", addr);
        if let Err(e) = run_session(socket, implicit_tls, deps, banner).await {
            warn!("Session from {} ended with error: {}", addr, e);
        }
        counter.fetch_sub(1, Ordering::SeqCst);
        info!("Connection closed for {}", addr);
    });
}

async fn run_session(
    socket: TcpStream,
    implicit_tls: bool,
    deps: SessionDeps,
    banner: Option<String>,
) -> Result<(), FtpError> {
    let stream = if implicit_tls {
        let acceptor = deps.certificates.acceptor().await?;
        let tls = acceptor
            .accept(socket)
            .await
            .map_err(|e| TlsError::TlsHandshakeError(e.to_string()))?;
        SecurableStream::Tls(Box::new(tls))
    } else {
        SecurableStream::Plain(socket)
    };
    let session = Session::new(stream, deps)?;
    handle_connection(session, banner).await
}

/// The per-connection control loop: greet, then read, parse and dispatch
/// one line at a time until the client quits, disconnects or times out.
pub async fn handle_connection(
    mut session: Session,
    banner: Option<String>,
) -> Result<(), FtpError> {
    info!(
        "[{}] Control connection from {}",
        session.id,
        session.peer_addr()
    );
    if let Some(text) = &banner {
        for line in text.lines() {
            session.send_response(&format!("220-{}", line)).await?;
        }
    }
    session.send_response(GREETING).await?;

    loop {
        let line = match session.read_command_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("[{}] Client disconnected", session.id);
                break;
            }
            Err(FtpError::Timeout) => {
                info!("[{}] Idle timeout, closing session", session.id);
                break;
            }
            Err(e) => {
                session.release_resources();
                return Err(e);
            }
        };

        let parsed = parse_command_line(&line);
        if parsed.verb.is_empty() {
            continue;
        }
        if parsed.verb == "PASS" {
            debug!("[{}] Received command: PASS ***", session.id);
        } else {
            debug!(
                "[{}] Received command: {} {}",
                session.id, parsed.verb, parsed.arg
            );
        }

        match FtpCommand::from_str(&parsed.verb) {
            Some(command) => {
                if let Err(e) = dispatch_command(command, &mut session, parsed.arg).await {
                    if e.is_fatal() {
                        error!("[{}] Fatal error handling {:?}: {}", session.id, command, e);
                        session.release_resources();
                        return Err(e);
                    }
                    warn!("[{}] Error handling {:?}: {}", session.id, command, e);
                    let response = e.to_ftp_response();
                    session.send_response(&response).await?;
                }
                // AUTH TLS: swap the control stream only after the 234 reply
                // has gone out in plaintext.
                if session.upgrade_requested {
                    session.upgrade_requested = false;
                    session.upgrade_control_tls().await?;
                }
            }
            None => {
                session.send_response("502 Command not implemented.").await?;
            }
        }

        if session.should_quit {
            break;
        }
    }

    session.release_resources();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core_auth::AnonymousAuthenticator;
    use crate::core_lock::PathLockManager;
    use crate::core_network::port_pool::PassivePortPool;
    use crate::core_network::stream::ActiveTransfers;
    use crate::core_storage::{MemoryStorage, StorageBackend};
    use crate::core_tls::{CertificateProvider, TlsConfig};
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

    struct TestClient {
        reader: BufReader<OwnedReadHalf>,
        writer: OwnedWriteHalf,
    }

    impl TestClient {
        async fn reply(&mut self) -> String {
            let mut line = String::new();
            self.reader.read_line(&mut line).await.unwrap();
            line
        }

        /// Reads a (possibly multi-line) reply until the terminating
        /// `<code><space>` line.
        async fn full_reply(&mut self) -> String {
            let first = self.reply().await;
            if first.len() < 4 || first.as_bytes()[3] != b'-' {
                return first;
            }
            let code = first[..3].to_string();
            let mut all = first.clone();
            loop {
                let line = self.reply().await;
                let done = line.starts_with(&code) && line.as_bytes().get(3) == Some(&b' ');
                all.push_str(&line);
                if done {
                    return all;
                }
            }
        }

        async fn command(&mut self, cmd: &str) -> String {
            self.writer
                .write_all(format!("{}\r\n", cmd).as_bytes())
                .await
                .unwrap();
            self.full_reply().await
        }

        async fn login(&mut self) {
            assert!(self.command("USER anonymous").await.starts_with("331"));
            assert!(self.command("PASS guest@example.com").await.starts_with("230"));
        }
    }

    fn test_config(pasv_start: u16, pasv_end: u16) -> Config {
        let mut config = Config::default();
        config.server.pasv_port_start = pasv_start;
        config.server.pasv_port_end = pasv_end;
        config.server.idle_timeout_secs = 0;
        config
    }

    fn test_deps(config: Config) -> SessionDeps {
        let pool = PassivePortPool::new(
            config.server.pasv_port_start,
            config.server.pasv_port_end,
        );
        SessionDeps {
            config: Arc::new(config),
            storage: Arc::new(MemoryStorage::new()),
            authenticator: Arc::new(AnonymousAuthenticator),
            locks: Arc::new(PathLockManager::new()),
            port_pool: Some(Arc::new(pool)),
            certificates: Arc::new(CertificateProvider::new(TlsConfig::default())),
            transfers: ActiveTransfers::new(),
        }
    }

    /// Spawns one session over a real loopback socket pair and returns a
    /// client with the greeting already consumed.
    async fn connect(deps: SessionDeps) -> TestClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        let (socket, _) = accepted.unwrap();

        let session = Session::new(SecurableStream::Plain(socket), deps).unwrap();
        tokio::spawn(async move {
            let _ = handle_connection(session, None).await;
        });

        let (reader, writer) = client.unwrap().into_split();
        let mut client = TestClient {
            reader: BufReader::new(reader),
            writer,
        };
        assert!(client.full_reply().await.starts_with("220"));
        client
    }

    fn parse_pasv(reply: &str) -> std::net::SocketAddr {
        let inside = reply
            .trim()
            .trim_start_matches("227 Entering Passive Mode (")
            .trim_end_matches(").");
        let fields: Vec<u16> = inside.split(',').map(|f| f.parse().unwrap()).collect();
        std::net::SocketAddr::from((
            [
                fields[0] as u8,
                fields[1] as u8,
                fields[2] as u8,
                fields[3] as u8,
            ],
            fields[4] * 256 + fields[5],
        ))
    }

    async fn store(client: &mut TestClient, path: &str, payload: &[u8]) {
        let pasv = client.command("PASV").await;
        let mut data = TcpStream::connect(parse_pasv(&pasv)).await.unwrap();
        assert!(client.command(&format!("STOR {}", path)).await.starts_with("150"));
        data.write_all(payload).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);
        assert!(client.full_reply().await.starts_with("226"));
    }

    async fn retrieve(client: &mut TestClient, path: &str) -> Vec<u8> {
        let pasv = client.command("PASV").await;
        let mut data = TcpStream::connect(parse_pasv(&pasv)).await.unwrap();
        assert!(client.command(&format!("RETR {}", path)).await.starts_with("150"));
        let mut out = Vec::new();
        data.read_to_end(&mut out).await.unwrap();
        assert!(client.full_reply().await.starts_with("226"));
        out
    }

    #[tokio::test]
    async fn login_handshake() {
        let mut client = connect(test_deps(test_config(51700, 51710))).await;
        assert!(client.command("USER anonymous").await.starts_with("331"));
        assert!(client
            .command("PASS guest@example.com")
            .await
            .starts_with("230"));
        assert!(client.command("SYST").await.starts_with("215"));
    }

    #[tokio::test]
    async fn rejected_login_and_sequence_errors() {
        let mut client = connect(test_deps(test_config(51712, 51718))).await;
        assert!(client.command("PASS whatever").await.starts_with("503"));
        assert!(client.command("USER alice").await.starts_with("331"));
        assert!(client.command("PASS secret").await.starts_with("530"));
    }

    #[tokio::test]
    async fn unknown_command_is_non_fatal() {
        let mut client = connect(test_deps(test_config(51720, 51726))).await;
        assert!(client.command("XYZZY").await.starts_with("502"));
        assert!(client.command("NOOP").await.starts_with("200"));
    }

    #[tokio::test]
    async fn cwd_pwd_flow() {
        let mut client = connect(test_deps(test_config(51728, 51734))).await;
        client.login().await;
        assert!(client.command("MKD docs").await.starts_with("257"));
        assert!(client.command("CWD docs").await.starts_with("250"));
        assert!(client.command("PWD").await.contains("\"/docs\""));
        assert!(client.command("CWD missing").await.starts_with("550"));
        assert!(client.command("PWD").await.contains("\"/docs\""));
        assert!(client.command("CDUP").await.starts_with("200"));
        assert!(client.command("PWD").await.contains("\"/\""));
    }

    #[tokio::test]
    async fn stor_size_retr_round_trip() {
        let deps = test_deps(test_config(51740, 51760));
        let mut client = connect(deps).await;
        client.login().await;

        store(&mut client, "/f.bin", b"HELLOWORLD").await;
        assert_eq!(client.command("SIZE /f.bin").await.trim(), "213 10");
        assert_eq!(retrieve(&mut client, "/f.bin").await, b"HELLOWORLD");
    }

    #[tokio::test]
    async fn rest_offsets_apply_to_retr_and_stor() {
        let deps = test_deps(test_config(51762, 51782));
        let storage = Arc::clone(&deps.storage);
        let mut client = connect(deps).await;
        client.login().await;

        store(&mut client, "/f.txt", b"HELLOWORLD").await;

        assert!(client.command("REST 5").await.starts_with("350"));
        assert_eq!(retrieve(&mut client, "/f.txt").await, b"WORLD");

        assert!(client.command("REST 5").await.starts_with("350"));
        store(&mut client, "/f.txt", b"BYE").await;
        let mut reader = storage.read("/f.txt", 0).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"HELLOBYE");

        assert!(client.command("REST x").await.starts_with("501"));
    }

    #[tokio::test]
    async fn appe_without_rest_appends() {
        let deps = test_deps(test_config(51784, 51804));
        let storage = Arc::clone(&deps.storage);
        let mut client = connect(deps).await;
        client.login().await;

        store(&mut client, "/f.txt", b"HELLO").await;
        let pasv = client.command("PASV").await;
        let mut data = TcpStream::connect(parse_pasv(&pasv)).await.unwrap();
        assert!(client.command("APPE /f.txt").await.starts_with("150"));
        data.write_all(b"WORLD").await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);
        assert!(client.full_reply().await.starts_with("226"));

        let mut reader = storage.read("/f.txt", 0).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"HELLOWORLD");
    }

    #[tokio::test]
    async fn rename_sequence_moves_content() {
        let deps = test_deps(test_config(51806, 51826));
        let storage = Arc::clone(&deps.storage);
        let mut client = connect(deps).await;
        client.login().await;

        store(&mut client, "/old.txt", b"payload").await;
        assert!(client.command("RNTO /new.txt").await.starts_with("503"));
        assert!(client.command("RNFR /old.txt").await.starts_with("350"));
        assert!(client.command("RNTO /new.txt").await.starts_with("250"));
        assert!(!storage.exists("/old.txt").await.unwrap());
        assert!(storage.exists("/new.txt").await.unwrap());
    }

    #[tokio::test]
    async fn list_requires_authentication() {
        let deps = test_deps(test_config(51828, 51848));
        let mut client = connect(deps).await;
        assert!(client.command("LIST").await.starts_with("530"));

        client.login().await;
        store(&mut client, "/visible.txt", b"x").await;
        let pasv = client.command("PASV").await;
        let mut data = TcpStream::connect(parse_pasv(&pasv)).await.unwrap();
        assert!(client.command("LIST").await.starts_with("150"));
        let mut listing = String::new();
        data.read_to_string(&mut listing).await.unwrap();
        assert!(client.full_reply().await.starts_with("226"));
        assert!(listing.contains("visible.txt"));
        assert!(listing.contains("-rwxr-xr-x"));
    }

    #[tokio::test]
    async fn quit_terminates_the_session() {
        let mut client = connect(test_deps(test_config(51850, 51856))).await;
        assert!(client.command("QUIT").await.starts_with("221"));
        let mut buf = [0u8; 16];
        let n = client.reader.read(&mut buf).await.unwrap();
        assert_eq!(n, 0, "server should close the connection after QUIT");
    }

    #[tokio::test]
    async fn concurrent_stores_to_distinct_paths_do_not_interfere() {
        let deps = test_deps(test_config(51858, 51898));
        let storage = Arc::clone(&deps.storage);

        let mut tasks = Vec::new();
        for i in 0..3u8 {
            let deps = deps.clone();
            tasks.push(tokio::spawn(async move {
                let mut client = connect(deps).await;
                client.login().await;
                let payload = vec![b'a' + i; 2048];
                store(&mut client, &format!("/file-{}.bin", i), &payload).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        for i in 0..3u8 {
            let mut reader = storage
                .read(&format!("/file-{}.bin", i), 0)
                .await
                .unwrap();
            let mut contents = Vec::new();
            reader.read_to_end(&mut contents).await.unwrap();
            assert_eq!(contents, vec![b'a' + i; 2048]);
        }
    }

    #[tokio::test]
    async fn pasv_ports_stay_in_range_and_are_not_shared() {
        let deps = test_deps(test_config(51900, 51920));
        let mut first = connect(deps.clone()).await;
        let mut second = connect(deps).await;

        let a = parse_pasv(&first.command("PASV").await).port();
        let b = parse_pasv(&second.command("PASV").await).port();
        assert!((51900..=51920).contains(&a));
        assert!((51900..=51920).contains(&b));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn rate_ceiling_bounds_transfer_time() {
        let mut config = test_config(51922, 51942);
        config.server.transfer_rate_limit = 4000;
        let mut client = connect(test_deps(config)).await;
        client.login().await;

        let started = Instant::now();
        store(&mut client, "/big.bin", &vec![0u8; 2000]).await;
        // 2000 bytes at 4000 B/s must take at least half a second, minus
        // scheduling slack.
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn ascii_mode_translates_line_endings() {
        let deps = test_deps(test_config(51944, 51964));
        let storage = Arc::clone(&deps.storage);
        let mut client = connect(deps).await;
        client.login().await;

        assert!(client.command("TYPE A").await.starts_with("200"));
        store(&mut client, "/notes.txt", b"one\r\ntwo\r\n").await;
        let mut reader = storage.read("/notes.txt", 0).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"one\ntwo\n");

        assert_eq!(retrieve(&mut client, "/notes.txt").await, b"one\r\ntwo\r\n");
    }
}
