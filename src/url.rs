use anyhow::{Context as _, Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// Where a checked URL points: enough to open a connection and write the
/// request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path and query; never empty.
    pub path: String,
}

impl Target {
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .with_context(|| format!("no scheme in url {url}"))?;

        let scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => bail!("unsupported scheme {other}"),
        };

        let (authority, path) = match rest.find(['/', '?', '#']) {
            Some(at) => rest.split_at(at),
            None => (rest, ""),
        };
        let path = path.split('#').next().unwrap_or_default();
        let path = match path {
            "" => String::from("/"),
            query if query.starts_with('?') => format!("/{query}"),
            path => path.to_string(),
        };

        let host_port = authority
            .rsplit_once('@')
            .map_or(authority, |(_userinfo, host_port)| host_port);

        let (host, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
            let (host, after) = bracketed
                .split_once(']')
                .context("unterminated IPv6 address")?;
            (host, after.strip_prefix(':'))
        } else {
            match host_port.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (host_port, None),
            }
        };

        if host.is_empty() {
            bail!("no host in url {url}");
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("invalid port {port}"))?,
            None => scheme.default_port(),
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            path,
        })
    }

    /// Value for the `Host` request header.
    pub fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        if self.port == self.scheme.default_port() {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let target = Target::parse("http://example.com").unwrap();
        assert_eq!(
            target,
            Target {
                scheme: Scheme::Http,
                host: "example.com".into(),
                port: 80,
                path: "/".into(),
            }
        );
        assert_eq!(target.host_header(), "example.com");
    }

    #[test]
    fn port_path_and_query() {
        let target = Target::parse("HTTPS://user:pw@example.com:8443/a/b.php?x=1#frag").unwrap();
        assert_eq!(target.scheme, Scheme::Https);
        assert_eq!(target.host, "example.com");
        assert_eq!(target.port, 8443);
        assert_eq!(target.path, "/a/b.php?x=1");
        assert_eq!(target.host_header(), "example.com:8443");

        let target = Target::parse("http://example.com?x=1").unwrap();
        assert_eq!(target.path, "/?x=1");
    }

    #[test]
    fn ipv6_hosts() {
        let target = Target::parse("http://[::1]:8080/").unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.port, 8080);
        assert_eq!(target.host_header(), "[::1]:8080");
    }

    #[test]
    fn rejects_what_it_cannot_fetch() {
        assert!(Target::parse("ftp://example.com/").is_err());
        assert!(Target::parse("example.com").is_err());
        assert!(Target::parse("http:///path").is_err());
        assert!(Target::parse("http://example.com:http/").is_err());
    }
}
