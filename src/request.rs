#[derive(Debug)]
pub enum Request {
    Get {
        path: String,
        headers: Vec<(String, String)>,
    },
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self::Get {
            path: path.into(),
            headers: vec![],
        }
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        match self {
            Request::Get { headers, .. } => {
                headers.push((name.into(), value.into()));
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Request::Get { path, headers } => {
                let headers = headers
                    .into_iter()
                    .map(|(name, value)| format!("{name}: {value}\r\n"))
                    .collect::<String>();
                format!("GET {path} HTTP/1.1\r\n{headers}\r\n").into_bytes()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_keep_their_order() {
        let mut request = Request::get("/a?b");
        request.add_header("Host", "example.com");
        request.add_header("User-Agent", "httplint");
        request.add_header("Connection", "close");

        assert_eq!(
            request.into_bytes(),
            b"GET /a?b HTTP/1.1\r\nHost: example.com\r\nUser-Agent: httplint\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn no_headers() {
        assert_eq!(Request::get("/").into_bytes(), b"GET / HTTP/1.1\r\n\r\n");
    }
}
