// ABOUTME: The SMPP session engine: framing loop, state machine enforcement, windowed dispatch
// ABOUTME: Coordinates one bound peer over an owned byte stream until shutdown

use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::codec::{Pdu, PduHeader};
use crate::context::Context;
use crate::datatypes::{CommandId, CommandStatus, GenericNack};
use crate::error::SessionError;
use crate::sequencer::{DefaultSequencer, Sequencer};
use crate::transition::{transition, Direction, Transition};

/// Session state per SMPP v3.4 Section 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state: connection established, no bind exchanged.
    Open,
    /// Bind request in flight; traffic is blocked until the peer answers.
    Binding,
    /// Bound as transmitter.
    BoundTx,
    /// Bound as receiver.
    BoundRx,
    /// Bound as transceiver.
    BoundTRx,
    /// Unbind in flight; traffic is blocked until unbinding finishes.
    Unbinding,
    /// Session is shutting down.
    Closing,
    /// Session is closed.
    Closed,
}

/// Role this session plays: ESME behaves like a client, SMSC like a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Esme,
    Smsc,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Esme => write!(f, "ESME"),
            SessionType::Smsc => write!(f, "SMSC"),
        }
    }
}

/// Handles decoded PDUs dispatched by the session engine.
///
/// One handler serves requests, another serves responses; both receive a
/// [`Context`] binding the PDU to its session and sequence. Handlers run on
/// their own tasks and must not retain the context after returning.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, ctx: &mut Context);
}

/// Fallback request handler: rejects everything with a system error.
struct DefaultRequestHandler;

#[async_trait]
impl Handler for DefaultRequestHandler {
    async fn serve(&self, ctx: &mut Context) {
        if let Err(err) = ctx
            .respond(Pdu::GenericNack(GenericNack), CommandStatus::SystemError)
            .await
        {
            debug!(%err, "default handler could not respond");
        }
    }
}

/// Fallback response handler: drops the response on the floor.
struct DefaultResponseHandler;

#[async_trait]
impl Handler for DefaultResponseHandler {
    async fn serve(&self, ctx: &mut Context) {
        debug!(command = ?ctx.command_id(), sequence = ctx.sequence(), "unhandled response");
    }
}

/// Observer invoked on every session state change with
/// `(session_id, system_id, new_state)`.
pub type SessionStateHook = Box<dyn Fn(&str, &str, SessionState) + Send + Sync>;

/// Structured session configuration.
///
/// Zero values select the documented defaults, mirroring how the engine is
/// usually configured from higher-level option structs.
pub struct SessionConfig {
    /// Role of this session end.
    pub session_type: SessionType,
    /// Cap on in-flight outbound requests. Zero selects 10.
    pub send_win_size: usize,
    /// Cap on in-flight inbound requests. Zero selects 10.
    pub req_win_size: usize,
    /// Per-request handler deadline. Zero selects 10 seconds.
    pub window_timeout: Duration,
    /// How often the `sent` window set is rebuilt into a fresh allocation.
    /// Zero selects 12 hours.
    pub map_reset_interval: Duration,
    /// Local identity announced to hooks; when empty, the identity observed
    /// from the peer's bind is used.
    pub system_id: String,
    /// Session identifier; an empty value is replaced by a generated
    /// 12-byte hex identifier.
    pub id: String,
    /// Outbound sequence number allocator.
    pub sequencer: Option<Box<dyn Sequencer>>,
    /// Receives every inbound request PDU.
    pub request_handler: Option<Arc<dyn Handler>>,
    /// Receives every correlated inbound response PDU.
    pub response_handler: Option<Arc<dyn Handler>>,
    /// State change observer.
    pub session_state: Option<SessionStateHook>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_type: SessionType::Esme,
            send_win_size: 0,
            req_win_size: 0,
            window_timeout: Duration::ZERO,
            map_reset_interval: Duration::ZERO,
            system_id: String::new(),
            id: String::new(),
            sequencer: None,
            request_handler: None,
            response_handler: None,
            session_state: None,
        }
    }
}

fn generate_session_id() -> String {
    let bytes: [u8; 12] = rand::rng().random();
    let hex = |octets: &[u8]| {
        octets
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<String>()
    };
    format!(
        "{}-{}-{}",
        hex(&bytes[0..4]),
        hex(&bytes[4..6]),
        hex(&bytes[6..12])
    )
}

/// State guarded by the session lock.
struct Shared {
    state: SessionState,
    /// Peer identity observed from the first bind PDU.
    system_id: String,
    /// In-flight inbound request count, bounded by `req_win_size`.
    req_count: usize,
    /// Sequence numbers of in-flight outbound requests, bounded by
    /// `send_win_size`. Responses are dispatched through the response
    /// handler, so the set exists for correlation and window accounting.
    sent: HashSet<u32>,
    sequencer: Box<dyn Sequencer>,
    /// Write half of the stream; taken on shutdown.
    writer: Option<Box<dyn AsyncWrite + Send + Unpin>>,
}

struct SessionInner {
    id: String,
    configured_system_id: String,
    session_type: SessionType,
    send_win_size: usize,
    req_win_size: usize,
    window_timeout: Duration,
    remote_addr: Option<SocketAddr>,
    request_handler: Arc<dyn Handler>,
    response_handler: Arc<dyn Handler>,
    state_hook: Option<SessionStateHook>,
    shared: Mutex<Shared>,
    /// Tracks the read loop and every dispatched handler task.
    tracker: TaskTracker,
    /// Cancelled when shutdown begins; wakes the read loop and every
    /// request token derived from it.
    closing: CancellationToken,
    /// Cancelled once the session has fully drained.
    closed: CancellationToken,
}

/// The engine that coordinates SMPP protocol for bound peers.
///
/// A `Session` is a cheap handle; clones refer to the same underlying
/// session. Creating one takes ownership of the stream and starts the read
/// loop, so [`Session::close`] must be called (or requested from a handler)
/// to dispose of it cleanly.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Create a session over an already-connected stream.
    ///
    /// The read loop starts immediately; inbound PDUs are dispatched to the
    /// configured handlers from this point on.
    pub fn new<S>(stream: S, conf: SessionConfig) -> Session
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::with_remote_addr(stream, None, conf)
    }

    /// Like [`Session::new`], also recording the peer address for contexts.
    pub fn with_remote_addr<S>(
        stream: S,
        remote_addr: Option<SocketAddr>,
        mut conf: SessionConfig,
    ) -> Session
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        if conf.send_win_size == 0 {
            conf.send_win_size = 10;
        }
        if conf.req_win_size == 0 {
            conf.req_win_size = 10;
        }
        if conf.window_timeout.is_zero() {
            conf.window_timeout = Duration::from_secs(10);
        }
        if conf.map_reset_interval.is_zero() {
            conf.map_reset_interval = Duration::from_secs(12 * 60 * 60);
        }
        if conf.id.is_empty() {
            conf.id = generate_session_id();
        }

        let (reader, writer) = tokio::io::split(stream);

        let inner = Arc::new(SessionInner {
            id: conf.id,
            configured_system_id: conf.system_id,
            session_type: conf.session_type,
            send_win_size: conf.send_win_size,
            req_win_size: conf.req_win_size,
            window_timeout: conf.window_timeout,
            remote_addr,
            request_handler: conf
                .request_handler
                .unwrap_or_else(|| Arc::new(DefaultRequestHandler)),
            response_handler: conf
                .response_handler
                .unwrap_or_else(|| Arc::new(DefaultResponseHandler)),
            state_hook: conf.session_state,
            shared: Mutex::new(Shared {
                state: SessionState::Open,
                system_id: String::new(),
                req_count: 0,
                sent: HashSet::with_capacity(conf.send_win_size),
                sequencer: conf
                    .sequencer
                    .unwrap_or_else(|| Box::new(DefaultSequencer::new())),
                writer: Some(Box::new(writer)),
            }),
            tracker: TaskTracker::new(),
            closing: CancellationToken::new(),
            closed: CancellationToken::new(),
        });

        inner
            .tracker
            .spawn(Arc::clone(&inner).serve(Box::new(reader)));
        tokio::spawn(reset_sent_periodically(
            Arc::clone(&inner),
            conf.map_reset_interval,
        ));

        Session { inner }
    }

    /// Unique session identifier.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Identity of the connected peer, `-` until a bind has been seen and
    /// no identity was configured.
    pub async fn system_id(&self) -> String {
        let shared = self.inner.shared.lock().await;
        self.inner.system_id_with(&shared)
    }

    /// Peer network address, when the stream had one.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.inner.remote_addr
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.inner.shared.lock().await.state
    }

    /// Send a request PDU, allocating its sequence number.
    ///
    /// Returns the sequence the peer will echo in its response; the response
    /// itself is delivered through the configured response handler. Fails
    /// with a temporary error when the send window is full or the PDU is not
    /// legal in the current state.
    pub async fn send_request(&self, pdu: Pdu) -> Result<u32, SessionError> {
        self.inner.send_request(pdu, None).await
    }

    /// Send a request PDU with a caller-supplied sequence number (used when
    /// relaying a PDU between sessions without re-numbering it).
    pub async fn send_request_with_sequence(
        &self,
        pdu: Pdu,
        sequence: u32,
    ) -> Result<u32, SessionError> {
        self.inner.send_request(pdu, Some(sequence)).await
    }

    /// Send a response PDU echoing the given request sequence.
    pub async fn send_response(
        &self,
        pdu: Pdu,
        sequence: u32,
        status: CommandStatus,
    ) -> Result<(), SessionError> {
        self.inner.send_response(pdu, sequence, status).await
    }

    /// Shut the session down.
    ///
    /// Drains the send window, releases the stream and waits for every
    /// dispatched handler to return. Calling close a second time fails with
    /// an invalid state change error.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.inner.close().await
    }

    /// Resolves once the session has reached `Closed` and all handler tasks
    /// have finished.
    pub async fn closed(&self) {
        self.inner.closed.cancelled().await
    }

    pub(crate) fn request_close(&self) {
        self.inner.spawn_close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("type", &self.inner.session_type)
            .finish_non_exhaustive()
    }
}

impl SessionInner {
    fn describe(&self) -> String {
        format!("({}:{})", self.session_type, self.id)
    }

    fn system_id_with(&self, shared: &Shared) -> String {
        if !self.configured_system_id.is_empty() {
            self.configured_system_id.clone()
        } else if !shared.system_id.is_empty() {
            shared.system_id.clone()
        } else {
            "-".to_string()
        }
    }

    /// The read loop. Frames one PDU at a time, enforces the receive-side
    /// state machine and fans decoded PDUs out to handler tasks.
    async fn serve(self: Arc<Self>, mut reader: Box<dyn AsyncRead + Send + Unpin>) {
        loop {
            let frame = tokio::select! {
                _ = self.closing.cancelled() => break,
                frame = read_pdu(&mut reader) => frame,
            };

            let (header, pdu) = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    if is_eof(&err) {
                        info!(session = %self.describe(), "peer closed the stream");
                    } else {
                        error!(session = %self.describe(), %err, "decoding pdu");
                    }
                    break;
                }
            };

            let mut shared = self.shared.lock().await;

            if let Some(system_id) = pdu.system_id() {
                shared.system_id = system_id.to_string();
            }

            if let Err(err) =
                self.apply_transition(&mut shared, header.command_id, Direction::Receive)
            {
                error!(session = %self.describe(), %err, "transitioning upon receive");
                continue;
            }

            if header.command_id.is_request() {
                info!(
                    session = %self.describe(),
                    command = ?header.command_id,
                    sequence = header.sequence_number,
                    "received request"
                );
                if shared.req_count == self.req_win_size {
                    self.throttle(&mut shared, header.sequence_number).await;
                    continue;
                }
                shared.req_count += 1;
                drop(shared);

                let sess = Arc::clone(&self);
                self.tracker
                    .spawn(async move { sess.handle_request(header, pdu).await });
            } else if shared.sent.remove(&header.sequence_number) {
                info!(
                    session = %self.describe(),
                    command = ?header.command_id,
                    sequence = header.sequence_number,
                    "received response"
                );
                drop(shared);

                let sess = Arc::clone(&self);
                self.tracker
                    .spawn(async move { sess.handle_response(header, pdu).await });
            } else {
                error!(
                    session = %self.describe(),
                    command = ?header.command_id,
                    sequence = header.sequence_number,
                    "unexpected response"
                );
            }
        }
        self.spawn_close();
    }

    /// Reject an inbound request with GenericNack(throttled), echoing its
    /// sequence. Called with the session lock held; does not change state.
    async fn throttle(&self, shared: &mut Shared, sequence: u32) {
        let buf = match Pdu::GenericNack(GenericNack)
            .to_bytes(CommandStatus::ThrottlingError, sequence)
        {
            Ok(buf) => buf,
            Err(err) => {
                error!(session = %self.describe(), %err, "error encoding pdu");
                return;
            }
        };
        if let Err(err) = write_all(shared, &buf).await {
            error!(session = %self.describe(), %err, "error sending GenericNack");
        }
    }

    async fn handle_request(self: Arc<Self>, header: PduHeader, pdu: Pdu) {
        // The request token derives from the session's closing token and
        // additionally fires once the handler deadline passes.
        let token = self.closing.child_token();
        let timer = {
            let token = token.clone();
            let deadline = self.window_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                token.cancel();
            })
        };

        let session = Session {
            inner: Arc::clone(&self),
        };
        let mut ctx = Context::new(session, token, header, pdu);
        self.request_handler.serve(&mut ctx).await;
        timer.abort();

        let close_requested = ctx.close_requested();
        drop(ctx);

        {
            let mut shared = self.shared.lock().await;
            shared.req_count -= 1;
        }
        if close_requested {
            self.spawn_close();
        }
    }

    async fn handle_response(self: Arc<Self>, header: PduHeader, pdu: Pdu) {
        let token = self.closing.child_token();
        let session = Session {
            inner: Arc::clone(&self),
        };
        let mut ctx = Context::new(session, token, header, pdu);
        self.response_handler.serve(&mut ctx).await;

        if ctx.close_requested() {
            self.spawn_close();
        }
    }

    async fn send_request(&self, pdu: Pdu, sequence: Option<u32>) -> Result<u32, SessionError> {
        let mut shared = self.shared.lock().await;

        if shared.sent.len() == self.send_win_size {
            return Err(SessionError::WindowClosed);
        }
        if let Err(err) = self.apply_transition(&mut shared, pdu.command_id(), Direction::Send) {
            error!(session = %self.describe(), %err, "transitioning before send");
            return Err(err);
        }

        let sequence = match sequence {
            Some(sequence) => sequence,
            None => shared.sequencer.next_sequence(),
        };
        let buf = pdu.to_bytes(CommandStatus::Ok, sequence)?;

        // Reserve the window slot before the bytes hit the wire: a fast
        // peer's response must find the sequence registered.
        shared.sent.insert(sequence);
        if let Err(err) = write_all(&mut shared, &buf).await {
            shared.sent.remove(&sequence);
            return Err(err);
        }

        info!(
            session = %self.describe(),
            command = ?pdu.command_id(),
            sequence,
            "request sent"
        );
        Ok(sequence)
    }

    async fn send_response(
        &self,
        pdu: Pdu,
        sequence: u32,
        status: CommandStatus,
    ) -> Result<(), SessionError> {
        let mut shared = self.shared.lock().await;

        if let Err(err) = self.apply_transition(&mut shared, pdu.command_id(), Direction::Send) {
            error!(session = %self.describe(), %err, "transitioning before response");
            return Err(err);
        }

        let buf = pdu.to_bytes(status, sequence)?;
        write_all(&mut shared, &buf).await?;

        info!(
            session = %self.describe(),
            command = ?pdu.command_id(),
            sequence,
            "response sent"
        );
        Ok(())
    }

    /// Check the PDU against the state machine and apply the follow-up
    /// state. Must be called with the session lock held.
    fn apply_transition(
        &self,
        shared: &mut Shared,
        id: CommandId,
        direction: Direction,
    ) -> Result<(), SessionError> {
        match transition(shared.state, self.session_type, id, direction) {
            Some(Transition::Stay) => Ok(()),
            Some(Transition::Enter(next)) => self.set_state(shared, next),
            None => Err(SessionError::InvalidState {
                command_id: id,
                state: shared.state,
            }),
        }
    }

    /// Direct state change with edge validation. Must be called with the
    /// session lock held.
    fn set_state(&self, shared: &mut Shared, next: SessionState) -> Result<(), SessionError> {
        use SessionState::*;

        let from = shared.state;
        let legal = match (from, next) {
            _ if from == next => false,
            (Closing, Closed) => true,
            (Closed, _) | (Closing, _) => false,
            (Open, Binding) => true,
            (Binding, Open | BoundTx | BoundRx | BoundTRx) => true,
            (BoundTx | BoundRx | BoundTRx, Unbinding) => true,
            // Shutdown may begin from any live state, including Open: a
            // peer that disconnects before binding still has to be
            // released.
            (_, Closing) => true,
            _ => false,
        };
        if !legal {
            return Err(SessionError::InvalidStateChange { from, to: next });
        }

        shared.state = next;
        debug!(session = %self.describe(), state = ?next, "session state");
        if let Some(hook) = &self.state_hook {
            hook(&self.id, &self.system_id_with(shared), next);
        }
        Ok(())
    }

    fn spawn_close(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = inner.close().await {
                debug!(session = %inner.describe(), %err, "session close");
            }
        });
    }

    async fn close(&self) -> Result<(), SessionError> {
        {
            let mut shared = self.shared.lock().await;
            self.set_state(&mut shared, SessionState::Closing)?;

            // Drain the send window: responses are dispatched through the
            // response handler, so draining here means any reply arriving
            // past this point is logged as unexpected and dropped.
            shared.sent.clear();

            // Wakes the read loop and cancels every in-flight request token.
            self.closing.cancel();

            if let Some(mut writer) = shared.writer.take() {
                let _ = writer.shutdown().await;
            }

            self.set_state(&mut shared, SessionState::Closed)?;
        }

        self.tracker.close();
        self.tracker.wait().await;

        info!(session = %self.describe(), "session closed");
        self.closed.cancel();
        Ok(())
    }
}

async fn read_pdu(
    reader: &mut Box<dyn AsyncRead + Send + Unpin>,
) -> Result<(PduHeader, Pdu), SessionError> {
    let mut header_bytes = [0u8; PduHeader::SIZE];
    reader.read_exact(&mut header_bytes).await?;
    let header = PduHeader::decode(&header_bytes)?;

    let body_len = header.command_length as usize - PduHeader::SIZE;
    let mut body = vec![0u8; body_len];
    if body_len > 0 {
        reader.read_exact(&mut body).await?;
    }

    let mut cursor = Cursor::new(&body[..]);
    let pdu = Pdu::decode_body(&header, &mut cursor)?;
    Ok((header, pdu))
}

async fn write_all(shared: &mut Shared, buf: &[u8]) -> Result<(), SessionError> {
    let writer = shared.writer.as_mut().ok_or(SessionError::Closed)?;
    writer.write_all(buf).await?;
    writer.flush().await?;
    Ok(())
}

fn is_eof(err: &SessionError) -> bool {
    matches!(err, SessionError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
}

/// Rebuild the `sent` set into a fresh allocation on a fixed cadence. The
/// set never shrinks its backing storage on remove, so a long-lived session
/// that once saturated its window would otherwise pin that memory forever.
async fn reset_sent_periodically(inner: Arc<SessionInner>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // the first tick completes immediately
    loop {
        tokio::select! {
            _ = inner.closing.cancelled() => return,
            _ = ticker.tick() => {
                let mut shared = inner.shared.lock().await;
                let fresh: HashSet<u32> = shared.sent.iter().copied().collect();
                shared.sent = fresh;
            }
        }
    }
}
