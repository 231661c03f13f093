#![allow(dead_code)]
//! Test harness: a scripted stand-in for the amp on a loopback socket.
//!
//! Each scripted connection reads one request, answers with its reply,
//! and closes, the same one-shot shape as the real device. The raw
//! requests are collected so tests can assert on the exact lines sent.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use ampctl_types::AmpSettings;

/// What the fake device does with one accepted connection.
pub enum Script {
    /// Read the request, write this reply, close.
    Reply(String),
    /// Read the request, then close without writing a byte.
    CloseSilently,
    /// Read the request, hold the connection open past the client's
    /// timeout, then close.
    Stall(Duration),
}

pub struct FakeAmp {
    pub addr: String,
    handle: thread::JoinHandle<Vec<String>>,
}

impl FakeAmp {
    /// Serve one connection per script entry, in order.
    pub fn serve(scripts: Vec<Script>) -> FakeAmp {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr").to_string();

        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for script in scripts {
                let (mut stream, _) = listener.accept().expect("accept");
                stream
                    .set_read_timeout(Some(Duration::from_secs(5)))
                    .expect("read timeout");

                let mut buf = [0u8; 512];
                let n = stream.read(&mut buf).unwrap_or(0);
                requests.push(String::from_utf8_lossy(&buf[..n]).into_owned());

                match script {
                    Script::Reply(reply) => {
                        stream.write_all(reply.as_bytes()).expect("write reply");
                    }
                    Script::CloseSilently => {}
                    Script::Stall(hold) => thread::sleep(hold),
                }
                // Dropping the stream closes the connection, which is how
                // the device ends its reply.
            }
            requests
        });

        FakeAmp { addr, handle }
    }

    /// Wait for all scripted connections and return the requests seen.
    pub fn finish(self) -> Vec<String> {
        self.handle.join().expect("fake amp thread")
    }
}

/// Build a reply the way the device would, independently of the codec
/// under test: four framing tokens, then the seventeen settings tokens in
/// the device's reply order.
pub fn reply_for(s: &AmpSettings) -> String {
    format!(
        "HTTP/1.1 200 OK settings: {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
        s.footswitches[0].bits(),
        s.footswitches[1].bits(),
        s.footswitches[2].bits(),
        (s.echo.delay_ms * 48.0).round() as i64,
        s.tremolo.rate_cps,
        s.distortion.gain_pct / 100.0,
        s.echo.feedback_pct / 100.0,
        s.tremolo.depth_pct / 100.0,
        s.distortion.mix_pct / 100.0,
        s.reverb.shimmer_hz,
        s.reverb.depth_pct / 100.0,
        s.flanger.speed_cps,
        s.flanger.range_pct / 100.0,
        s.flanger.color_pct / 100.0,
        s.flanger.filter_mode as u8,
        s.knobs[0].index(),
        s.knobs[1].index(),
    )
}
