use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Html,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub format: Format,
    pub user_agent: String,
    /// Applied to every socket read and write.
    pub timeout: Duration,
    /// Lines of this many bytes or more are reported as too long.
    pub max_line_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::Text,
            user_agent: String::from("httplint"),
            timeout: Duration::from_secs(30),
            max_line_length: 400,
        }
    }
}
