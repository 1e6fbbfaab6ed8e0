//! JSON-RPC client used to drive the `godog-lens-lsp` binary.
//!
//! Messages use `Content-Length` framing. Replies are read on a background
//! thread so that a stalled server fails the test instead of hanging it.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

/// Longest wait for any single message.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest wait for the process to exit after `exit`.
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Messages skipped while waiting for a response.
const MAX_SKIPPED: usize = 10;

/// Frame `body` with a `Content-Length` header.
#[expect(
    clippy::expect_used,
    reason = "serialisation failure is a test-fatal programming error"
)]
pub fn frame(body: &Value) -> Vec<u8> {
    let payload = serde_json::to_vec(body).expect("serialise JSON-RPC body");
    let mut framed = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
    framed.extend_from_slice(&payload);
    framed
}

/// Read one framed message, or `None` at end of stream.
#[expect(
    clippy::expect_used,
    reason = "malformed frames are test-fatal protocol errors"
)]
fn read_frame(reader: &mut impl BufRead) -> Option<Value> {
    let mut length = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).expect("read header") == 0 {
            return None;
        }
        let header = header.trim();
        if header.is_empty() {
            break;
        }
        if let Some(value) = header.strip_prefix("Content-Length:") {
            length = Some(value.trim().parse::<usize>().expect("content length"));
        }
    }
    let mut body = vec![0_u8; length?];
    reader.read_exact(&mut body).expect("read body");
    Some(serde_json::from_slice(&body).expect("JSON body"))
}

/// A running server process and its message streams.
pub struct LspClient {
    child: Child,
    stdin: ChildStdin,
    incoming: mpsc::Receiver<Value>,
    next_id: u64,
}

impl LspClient {
    /// Start the binary with `extra_args` after the default flags.
    #[expect(
        clippy::expect_used,
        reason = "spawn failures are test-fatal environment errors"
    )]
    pub fn spawn(extra_args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_godog-lens-lsp"))
            .args(["--log-level", "error"])
            .args(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("start godog-lens-lsp binary");
        let stdin = child.stdin.take().expect("server stdin");
        let stdout = child.stdout.take().expect("server stdout");

        let (tx, incoming) = mpsc::channel();
        std::thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            while let Some(message) = read_frame(&mut reader) {
                if tx.send(message).is_err() {
                    break;
                }
            }
        });

        Self {
            child,
            stdin,
            incoming,
            next_id: 1,
        }
    }

    #[expect(clippy::expect_used, reason = "write failure is a test-fatal I/O error")]
    fn send(&mut self, body: &Value) {
        self.stdin.write_all(&frame(body)).expect("write message");
        self.stdin.flush().expect("flush server stdin");
    }

    /// Send a notification.
    pub fn notify(&mut self, method: &str, params: Value) {
        self.send(&json!({ "jsonrpc": "2.0", "method": method, "params": params }));
    }

    /// Send a request and return the whole response message.
    ///
    /// # Panics
    ///
    /// Panics when no response with the request id arrives in time.
    #[expect(clippy::expect_used, reason = "a stalled server fails the test")]
    pub fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        self.send(&json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }));

        for _ in 0..MAX_SKIPPED {
            let message = self
                .incoming
                .recv_timeout(READ_TIMEOUT)
                .expect("timed out waiting for the server");
            if message.get("id").and_then(Value::as_u64) == Some(id) {
                return message;
            }
        }
        panic!("no response for request {id} ({method})");
    }

    /// Perform the `initialize`/`initialized` handshake for `root_uri`.
    pub fn initialize(&mut self, root_uri: &str, options: Value) -> Value {
        let response = self.request(
            "initialize",
            json!({
                "processId": null,
                "capabilities": {},
                "rootUri": root_uri,
                "initializationOptions": options,
            }),
        );
        self.notify("initialized", json!({}));
        response
    }

    /// Shut the server down and wait for a clean exit.
    ///
    /// # Panics
    ///
    /// Panics when the server fails to answer `shutdown`, exits with an
    /// error, or outlives the exit timeout.
    #[expect(clippy::expect_used, reason = "shutdown failures fail the test")]
    pub fn shutdown(mut self) {
        let response = self.request("shutdown", Value::Null);
        assert_eq!(response.get("result"), Some(&Value::Null));
        self.notify("exit", Value::Null);

        let deadline = Instant::now() + EXIT_TIMEOUT;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait().expect("poll server exit") {
                assert!(status.success(), "server should exit cleanly, got: {status}");
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
        panic!("server did not exit within {} s", EXIT_TIMEOUT.as_secs());
    }
}
