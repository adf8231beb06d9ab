use crate::Request;
use anyhow::{Context as _, Result};
use rustls::{
    ClientConfig, RootCertStore,
    client::UnbufferedClientConnection,
    pki_types::ServerName,
    unbuffered::{
        AppDataRecord, ConnectionState, EncodeError, EncryptError, InsufficientSizeError,
        UnbufferedStatus,
    },
};
use std::sync::Arc;

/// Sans-io TLS client: tells the caller which socket operation it needs and
/// collects the decrypted response bytes, never touching a socket itself.
pub struct FSM {
    conn: UnbufferedClientConnection,
    request: Option<Vec<u8>>,
    received: Vec<u8>,

    incoming_tls: Vec<u8>,
    outgoing_tls: Vec<u8>,

    incoming_start: usize,
    incoming_end: usize,
    outgoing_start: usize,
    outgoing_end: usize,
}

pub enum Wants<'a> {
    Read(&'a mut [u8]),
    Write(&'a [u8]),
    /// The peer closed the TLS session.
    Done,
}

impl FSM {
    pub fn new(name: ServerName<'static>, request: Request) -> Result<Self> {
        Ok(Self {
            conn: UnbufferedClientConnection::new(client_config(), name)?,
            request: Some(request.into_bytes()),
            received: vec![],

            incoming_tls: vec![0; INCOMING_TLS_BUFSIZE],
            outgoing_tls: vec![0; OUTGOING_TLS_INITIAL_BUFSIZE],

            incoming_start: 0,
            incoming_end: 0,
            outgoing_start: 0,
            outgoing_end: 0,
        })
    }

    pub fn wants(&mut self) -> Result<Wants<'_>> {
        loop {
            log::trace!(
                "process TLS records: {}",
                self.incoming_end - self.incoming_start
            );

            let UnbufferedStatus { discard, state } = self.conn.process_tls_records(
                &mut self.incoming_tls[self.incoming_start..self.incoming_end],
            );

            self.incoming_start += discard;

            let state = state.context("malformed internal state")?;

            match state {
                ConnectionState::ReadTraffic(mut state) => {
                    while let Some(res) = state.next_record() {
                        let AppDataRecord {
                            discard: new_discard,
                            payload,
                        } = res.context("failed to get AppDataRecord")?;

                        self.incoming_start += new_discard;

                        log::debug!("received {}B of response data", payload.len());
                        self.received.extend_from_slice(payload);
                    }
                }

                ConnectionState::EncodeTlsData(mut state) => {
                    let written = match state.encode(&mut self.outgoing_tls[self.outgoing_end..]) {
                        Ok(written) => written,

                        Err(EncodeError::InsufficientSize(InsufficientSizeError {
                            required_size,
                        })) => {
                            let new_len = self.outgoing_end + required_size;
                            self.outgoing_tls.resize(new_len, 0);
                            state.encode(&mut self.outgoing_tls[self.outgoing_end..])?
                        }

                        Err(e) => {
                            return Err(e.into());
                        }
                    };

                    self.outgoing_end += written;
                }

                ConnectionState::TransmitTlsData(mut state) => {
                    if let Some(mut may_encrypt) = state.may_encrypt_app_data() {
                        if let Some(request) = self.request.take() {
                            let written = encrypt_growing(
                                &mut self.outgoing_tls,
                                self.outgoing_end,
                                |buf| may_encrypt.encrypt(&request, buf),
                            )?;
                            self.outgoing_end += written;
                            log::debug!("queued HTTP request");
                        }
                    }

                    if self.outgoing_start == self.outgoing_end {
                        state.done();
                    } else {
                        return Ok(self.want_write());
                    }
                }

                ConnectionState::BlockedHandshake { .. } => {
                    self.resize_incoming_if_needed();
                    return Ok(self.want_read());
                }

                ConnectionState::WriteTraffic(mut may_encrypt) => {
                    if let Some(request) = self.request.take() {
                        let written = encrypt_growing(
                            &mut self.outgoing_tls,
                            self.outgoing_end,
                            |buf| may_encrypt.encrypt(&request, buf),
                        )?;
                        self.outgoing_end += written;
                        log::debug!("queued HTTP request");
                        return Ok(self.want_write());
                    }

                    // request is out; everything else is the server talking
                    self.resize_incoming_if_needed();
                    return Ok(self.want_read());
                }

                ConnectionState::PeerClosed | ConnectionState::Closed => {
                    return Ok(Wants::Done);
                }

                _ => unreachable!(),
            }
        }
    }

    /// Decrypted response bytes received since the last call.
    pub fn take_received(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.received)
    }

    fn resize_incoming_if_needed(&mut self) {
        if self.incoming_start == self.incoming_end {
            self.incoming_start = 0;
            self.incoming_end = 0;
        }
        if self.incoming_end == self.incoming_tls.len() {
            let new_len = self.incoming_tls.len() + INCOMING_TLS_BUFSIZE;
            self.incoming_tls.resize(new_len, 0);
            log::debug!("grew buffer to {} bytes", new_len);
        }
    }

    fn want_write(&self) -> Wants<'_> {
        Wants::Write(&self.outgoing_tls[self.outgoing_start..self.outgoing_end])
    }

    fn want_read(&mut self) -> Wants<'_> {
        Wants::Read(&mut self.incoming_tls[self.incoming_end..])
    }

    pub fn done_reading(&mut self, read: usize) {
        self.incoming_end += read;
    }

    pub fn done_writing(&mut self, written: usize) {
        self.outgoing_start += written;
        if self.outgoing_start == self.outgoing_end {
            self.outgoing_start = 0;
            self.outgoing_end = 0;
        }
    }
}

/// Runs `encrypt` into `outgoing[end..]`, growing the buffer once if the
/// record does not fit.
fn encrypt_growing(
    outgoing: &mut Vec<u8>,
    end: usize,
    mut encrypt: impl FnMut(&mut [u8]) -> Result<usize, EncryptError>,
) -> Result<usize> {
    match encrypt(&mut outgoing[end..]) {
        Ok(written) => Ok(written),

        Err(EncryptError::InsufficientSize(InsufficientSizeError { required_size })) => {
            outgoing.resize(end + required_size, 0);
            encrypt(&mut outgoing[end..]).context("encrypted request does not fit in `outgoing_tls`")
        }

        Err(e) => Err(e.into()),
    }
}

fn client_config() -> Arc<ClientConfig> {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.into(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

const KB: usize = 1024;
const INCOMING_TLS_BUFSIZE: usize = 16 * KB;
const OUTGOING_TLS_INITIAL_BUFSIZE: usize = KB;
