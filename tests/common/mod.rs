//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use counter_service::config::ServiceConfig;
use counter_service::http::{AppState, HttpServer};
use counter_service::lifecycle::{self, Shutdown};

/// In-process stand-in for a Redis server.
///
/// Understands PING, AUTH and INCR on a single counter; any other command
/// gets `+OK`. INCR is a `fetch_add`, so concurrent increments are atomic the
/// same way they are on a real store. While stalled, INCR is read but never
/// answered.
pub struct MockStore {
    pub addr: SocketAddr,
    counter: Arc<AtomicI64>,
    stall: Arc<AtomicBool>,
    kill: watch::Sender<bool>,
}

impl MockStore {
    pub async fn start(password: Option<&'static str>) -> Self {
        Self::start_at("127.0.0.1:0".parse().unwrap(), Arc::new(AtomicI64::new(0)), password).await
    }

    /// Listen on `addr`, sharing `counter` with any earlier instance.
    pub async fn start_at(
        addr: SocketAddr,
        counter: Arc<AtomicI64>,
        password: Option<&'static str>,
    ) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (kill, _) = watch::channel(false);

        let mut kill_rx = kill.subscribe();
        let conn_kill = kill_rx.clone();
        let shared = counter.clone();
        let stall = Arc::new(AtomicBool::new(false));
        let conn_stall = stall.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = kill_rx.changed() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((socket, _)) => {
                            tokio::spawn(serve_conn(
                                socket,
                                shared.clone(),
                                conn_stall.clone(),
                                password,
                                conn_kill.clone(),
                            ));
                        }
                        Err(_) => break,
                    },
                }
            }
        });

        Self {
            addr,
            counter,
            stall,
            kill,
        }
    }

    pub fn set_counter(&self, value: i64) {
        self.counter.store(value, Ordering::SeqCst);
    }

    pub fn counter(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn shared_counter(&self) -> Arc<AtomicI64> {
        self.counter.clone()
    }

    /// Leave every following INCR unanswered while `on`.
    pub fn stall_increments(&self, on: bool) {
        self.stall.store(on, Ordering::SeqCst);
    }

    /// Stop accepting and drop every open connection.
    pub async fn kill(&self) {
        let _ = self.kill.send(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

async fn serve_conn(
    mut socket: TcpStream,
    counter: Arc<AtomicI64>,
    stall: Arc<AtomicBool>,
    password: Option<&'static str>,
    mut kill: watch::Receiver<bool>,
) {
    let mut authed = password.is_none();
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        tokio::select! {
            _ = kill.changed() => return,
            read = socket.read(&mut chunk) => {
                let n = match read {
                    Ok(0) | Err(_) => return,
                    Ok(n) => n,
                };
                buf.extend_from_slice(&chunk[..n]);

                while let Some((args, used)) = parse_command(&buf) {
                    buf.drain(..used);
                    let Some(reply) = respond(&args, &counter, &stall, password, &mut authed) else {
                        continue;
                    };
                    if socket.write_all(reply.as_bytes()).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}

fn respond(
    args: &[String],
    counter: &AtomicI64,
    stall: &AtomicBool,
    password: Option<&str>,
    authed: &mut bool,
) -> Option<String> {
    let Some(name) = args.first() else {
        return Some("-ERR empty command\r\n".to_string());
    };

    let reply = match name.to_ascii_uppercase().as_str() {
        "AUTH" => {
            let given = args.last().map(String::as_str);
            match password {
                None => "-ERR AUTH called without any password configured\r\n".to_string(),
                Some(expected) if given == Some(expected) && args.len() >= 2 => {
                    *authed = true;
                    "+OK\r\n".to_string()
                }
                Some(_) => "-WRONGPASS invalid username-password pair\r\n".to_string(),
            }
        }
        _ if !*authed => "-NOAUTH Authentication required.\r\n".to_string(),
        "PING" => "+PONG\r\n".to_string(),
        "INCR" if stall.load(Ordering::SeqCst) => return None,
        "INCR" => format!(":{}\r\n", counter.fetch_add(1, Ordering::SeqCst) + 1),
        _ => "+OK\r\n".to_string(),
    };
    Some(reply)
}

/// Parse one RESP array of bulk strings; returns the args and bytes consumed.
fn parse_command(buf: &[u8]) -> Option<(Vec<String>, usize)> {
    if buf.first()? != &b'*' {
        return None;
    }
    let (count, mut pos) = read_len(buf, 1)?;
    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        if buf.get(pos)? != &b'$' {
            return None;
        }
        let (len, start) = read_len(buf, pos + 1)?;
        let end = start + len;
        if buf.len() < end + 2 {
            return None;
        }
        args.push(String::from_utf8_lossy(&buf[start..end]).into_owned());
        pos = end + 2;
    }
    Some((args, pos))
}

fn read_len(buf: &[u8], start: usize) -> Option<(usize, usize)> {
    let rel = buf.get(start..)?.windows(2).position(|w| w == b"\r\n")?;
    let n = std::str::from_utf8(&buf[start..start + rel]).ok()?.parse().ok()?;
    Some((n, start + rel + 2))
}

/// An address nothing listens on (right now).
pub async fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Service config pointing at `store`, with short timeouts.
pub fn service_config(store: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.store.host = store.ip().to_string();
    config.store.port = store.port();
    config.store.connect_timeout_ms = 500;
    config.store.response_timeout_ms = 500;
    config.instance.id = "test-instance".to_string();
    config
}

pub struct TestService {
    pub base_url: String,
    pub state: AppState,
    pub shutdown: Shutdown,
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Run startup (including the probe) and serve on an ephemeral port.
pub async fn start_service(config: ServiceConfig) -> TestService {
    let state = lifecycle::prepare(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestService {
        base_url: format!("http://{}", addr),
        state,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// GET `path` and return status and JSON body.
pub async fn get_json(service: &TestService, path: &str) -> (u16, serde_json::Value) {
    let res = client()
        .get(format!("{}{}", service.base_url, path))
        .send()
        .await
        .expect("service unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}
