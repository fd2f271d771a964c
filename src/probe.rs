//! Sixel capability detection.
//!
//! A sink can take a sixel payload only when it is an interactive terminal
//! that understands the protocol. The decision is made in three steps:
//!
//! 1. the sink must be a terminal, otherwise escape codes would end up in a
//!    file or pipe,
//! 2. terminal families known to render sixel are accepted from `TERM`,
//! 3. anything else is asked directly with a primary device attributes (DA1)
//!    query, which lists `4` among its parameters when sixel is available.
//!
//! Any failure along the way means "no sixel".

use log::debug;
use std::{io, time::Duration};

/// How long to wait for the terminal to answer the DA1 query.
pub const QUERY_TIMEOUT: Duration = Duration::from_millis(100);

/// `TERM` prefixes of terminals that render sixel.
const SIXEL_TERMS: &[&str] = &["foot", "mlterm", "yaft", "contour", "wezterm"];

/// DA1 parameter announcing sixel graphics.
const DA1_SIXEL: u32 = 4;

/// Access to the terminal behind an output sink.
///
/// The real implementation talks to the controlling terminal; tests swap in
/// a fake.
pub trait DeviceQuery {
    /// Whether the sink is an interactive terminal.
    fn is_terminal(&self) -> bool;

    /// Value of `TERM`, if any.
    fn term(&self) -> Option<String>;

    /// Send `ESC [ c` and return the raw reply, giving up after `timeout`.
    fn primary_attributes(&mut self, timeout: Duration) -> io::Result<Vec<u8>>;
}

/// Decide whether sixel output is safe for the terminal behind `query`.
pub fn probe<Q: DeviceQuery>(query: &mut Q) -> bool {
    if !query.is_terminal() {
        debug!("Sink is not a terminal, sixel disabled");
        return false;
    }

    if let Some(term) = query.term() {
        if is_sixel_term(&term) {
            debug!("TERM={} is known to support sixel", term);
            return true;
        }
    }

    match query.primary_attributes(QUERY_TIMEOUT) {
        Ok(reply) => match parse_da1(&reply) {
            Some(params) => {
                debug!("DA1 parameters: {:?}", params);
                params.contains(&DA1_SIXEL)
            }
            None => {
                debug!("Unrecognised DA1 reply: {:X?}", reply);
                false
            }
        },
        Err(err) => {
            debug!("DA1 query failed: {}", err);
            false
        }
    }
}

fn is_sixel_term(term: &str) -> bool {
    term.contains("sixel") || SIXEL_TERMS.iter().any(|prefix| term.starts_with(prefix))
}

/// Parameters of a DA1 reply: `ESC [ ? Ps ; Ps ; ... c`.
pub fn parse_da1(input: &[u8]) -> Option<Vec<u32>> {
    let start = input.windows(3).position(|w| w == b"\x1b[?")? + 3;
    let end = start + input[start..].iter().position(|&b| b == b'c')?;
    let params = std::str::from_utf8(&input[start..end]).ok()?;

    params
        .split(';')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<u32>>>()
}

/// Whether sixel output written to `sink` would be rendered.
#[cfg(unix)]
pub fn is_sixel_supported<S: std::os::unix::io::AsRawFd>(sink: &S) -> bool {
    probe(&mut tty::Tty::new(sink))
}

/// Whether sixel output written to `sink` would be rendered.
#[cfg(not(unix))]
pub fn is_sixel_supported<S>(_sink: &S) -> bool {
    false
}

#[cfg(unix)]
mod tty {
    use super::DeviceQuery;
    use log::debug;
    use std::{
        fs::{File, OpenOptions},
        io::{self, Read, Write},
        os::unix::io::{AsRawFd, RawFd},
        time::{Duration, Instant},
    };

    const DA1_QUERY: &[u8] = b"\x1b[c";
    const CONTROLLING_TERMINAL: &str = "/dev/tty";

    /// Quiet period that must pass before a timed out query is considered
    /// settled. A reply arriving inside it is read and discarded.
    const LATE_REPLY_GRACE: Duration = Duration::from_millis(50);

    /// Upper bound on the time spent discarding late input.
    const LATE_REPLY_LIMIT: Duration = Duration::from_millis(500);

    /// The controlling terminal of the process, queried on behalf of a sink.
    pub struct Tty {
        sink_is_terminal: bool,
    }

    impl Tty {
        pub fn new<S: AsRawFd>(sink: &S) -> Self {
            // SAFETY: isatty is safe to call with any fd
            let sink_is_terminal = unsafe { libc::isatty(sink.as_raw_fd()) == 1 };
            Tty { sink_is_terminal }
        }
    }

    impl DeviceQuery for Tty {
        fn is_terminal(&self) -> bool {
            self.sink_is_terminal
        }

        fn term(&self) -> Option<String> {
            std::env::var("TERM").ok()
        }

        fn primary_attributes(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
            let mut tty = OpenOptions::new()
                .read(true)
                .write(true)
                .open(CONTROLLING_TERMINAL)?;
            let _guard = RawModeGuard::new(tty.as_raw_fd())?;

            tty.write_all(DA1_QUERY)?;
            tty.flush()?;

            let result = read_reply(&mut tty, timeout);
            if result.is_err() {
                let discarded = discard_late_reply(&mut tty, LATE_REPLY_GRACE, LATE_REPLY_LIMIT);
                debug!("Discarded {} bytes of late DA1 reply", discarded);
                // SAFETY: tcflush only touches the queue of a valid fd
                unsafe { libc::tcflush(tty.as_raw_fd(), libc::TCIFLUSH) };
            }
            result
        }
    }

    /// Read and drop input until none has arrived for `grace`, or until
    /// `limit` has passed. Returns the number of bytes dropped.
    pub(super) fn discard_late_reply(tty: &mut File, grace: Duration, limit: Duration) -> usize {
        let deadline = Instant::now() + limit;
        let mut buf = [0u8; 64];
        let mut discarded = 0;

        while Instant::now() < deadline {
            match wait_readable(tty.as_raw_fd(), grace) {
                Ok(true) => {}
                _ => break,
            }
            match tty.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => discarded += n,
            }
        }
        discarded
    }

    /// Read until the `c` closing a DA1 reply or until `timeout` elapses.
    pub(super) fn read_reply(tty: &mut File, timeout: Duration) -> io::Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut reply: Vec<u8> = Vec::new();
        let mut buf = [0u8; 64];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining == Duration::from_millis(0) || !wait_readable(tty.as_raw_fd(), remaining)? {
                debug!("DA1 reply timed out after {:X?}", reply);
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "terminal did not answer the DA1 query",
                ));
            }

            let n = tty.read(&mut buf)?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal closed while reading the DA1 reply",
                ));
            }
            reply.extend_from_slice(&buf[..n]);

            if let Some(start) = reply.windows(3).position(|w| w == b"\x1b[?") {
                if reply[start..].contains(&b'c') {
                    return Ok(reply);
                }
            }
        }
    }

    fn wait_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
        let mut pollfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: pollfd points to one valid, initialised entry
        let result = unsafe { libc::poll(&mut pollfd, 1, millis) };
        if result == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(result > 0)
        }
    }

    /// Raw mode on the terminal for the length of one query.
    ///
    /// Echo and line buffering are switched off so the reply is neither
    /// printed nor held back; the original settings come back on drop.
    struct RawModeGuard {
        fd: RawFd,
        original: libc::termios,
    }

    impl RawModeGuard {
        fn new(fd: RawFd) -> io::Result<Self> {
            // SAFETY: termios is plain data and tcgetattr fills it in
            let mut original: libc::termios = unsafe { std::mem::zeroed() };
            if unsafe { libc::tcgetattr(fd, &mut original) } == -1 {
                return Err(io::Error::last_os_error());
            }

            let mut settings = original;
            settings.c_lflag &= !(libc::ECHO | libc::ICANON);
            settings.c_cc[libc::VMIN] = 0;
            settings.c_cc[libc::VTIME] = 0;

            // SAFETY: settings is a valid termios copied from the terminal
            if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &settings) } == -1 {
                return Err(io::Error::last_os_error());
            }

            Ok(RawModeGuard { fd, original })
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            // SAFETY: restores the settings read in `new`
            unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) };
        }
    }
}
