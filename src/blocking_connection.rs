use crate::{Config, FSM, Flow, HeadReader, Request, Scheme, Target, Wants};
use anyhow::{Context as _, Result, bail};
use rustls::pki_types::ServerName;
use std::{
    io::{Read as _, Write as _},
    net::TcpStream,
};

pub struct BlockingConnection;

impl BlockingConnection {
    /// Requests `target` and hands every received head line to `on_line`
    /// until it answers [`Flow::Stop`]. The body is never read.
    pub fn get(
        target: &Target,
        config: &Config,
        mut on_line: impl FnMut(&[u8]) -> Flow,
    ) -> Result<()> {
        let mut request = Request::get(&target.path);
        request.add_header("Host", target.host_header());
        request.add_header("User-Agent", config.user_agent.as_str());
        request.add_header("Connection", "close");

        let mut sock = TcpStream::connect((target.host.as_str(), target.port))
            .with_context(|| format!("failed to connect to {}:{}", target.host, target.port))?;
        sock.set_read_timeout(Some(config.timeout))?;
        sock.set_write_timeout(Some(config.timeout))?;
        log::debug!("connected to {}:{}", target.host, target.port);

        let mut reader = HeadReader::new();
        match target.scheme {
            Scheme::Http => plain(&mut sock, request, &mut reader, &mut on_line)?,
            Scheme::Https => {
                let server_name = ServerName::try_from(target.host.as_str())
                    .with_context(|| format!("invalid server name {}", target.host))?
                    .to_owned();
                let fsm = FSM::new(server_name, request)?;
                tls(&mut sock, fsm, &mut reader, &mut on_line)?
            }
        }

        if reader.lines() == 0 {
            bail!("no headers received");
        }
        Ok(())
    }
}

fn plain(
    sock: &mut TcpStream,
    request: Request,
    reader: &mut HeadReader,
    on_line: &mut impl FnMut(&[u8]) -> Flow,
) -> Result<()> {
    sock.write_all(&request.into_bytes())
        .context("failed to send request")?;

    let mut buf = [0; 4 * KB];
    loop {
        let read = sock.read(&mut buf).context("failed to read response")?;
        if read == 0 {
            log::debug!("server closed the connection");
            reader.finish(on_line);
            return Ok(());
        }
        log::debug!("received {read}B of response data");

        reader.feed(&buf[..read]);
        if reader.dispatch(on_line) == Flow::Stop {
            log::debug!("end of headers, dropping the rest of the response");
            return Ok(());
        }
    }
}

fn tls(
    sock: &mut TcpStream,
    mut fsm: FSM,
    reader: &mut HeadReader,
    on_line: &mut impl FnMut(&[u8]) -> Flow,
) -> Result<()> {
    loop {
        match fsm.wants()? {
            Wants::Read(buf) => {
                let read = sock.read(buf).context("failed to read from socket")?;
                if read == 0 {
                    log::debug!("server closed the connection without close_notify");
                    break;
                }
                fsm.done_reading(read);
            }
            Wants::Write(buf) => {
                let written = sock.write(buf).context("failed to write to socket")?;
                fsm.done_writing(written);
            }
            Wants::Done => break,
        }

        reader.feed(&fsm.take_received());
        if reader.dispatch(on_line) == Flow::Stop {
            log::debug!("end of headers, dropping the rest of the response");
            return Ok(());
        }
    }

    reader.feed(&fsm.take_received());
    if reader.dispatch(on_line) == Flow::Continue {
        reader.finish(on_line);
    }
    Ok(())
}

const KB: usize = 1024;
