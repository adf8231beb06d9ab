//! Checks the header block of an HTTP response against the protocol grammar
//! and reports every conforming, unusual or broken header it sees.
//!
//! The engine ([`Linter`]) only ever sees raw lines and produces [`Event`]s.
//! Fetching ([`BlockingConnection`]) and output ([`Renderer`]) are kept apart
//! from it so the checks can be driven from anything that yields lines.

mod blocking_connection;
mod catalog;
mod config;
mod cookie;
mod date;
mod fsm;
mod headers;
mod linter;
mod list;
mod patterns;
mod report;
mod request;
mod response;
mod status;
mod url;

pub use blocking_connection::BlockingConnection;
pub use catalog::{Diagnostic, Severity, lookup};
pub use config::{Config, Format};
pub use date::{DateFormat, ParsedTimestamp, parse_date};
pub use fsm::{FSM, Wants};
pub use linter::{Clock, Event, Linter, Note};
pub use list::{Bounds, ListError, ListItem, parse_list};
pub use patterns::Patterns;
pub use report::Renderer;
pub use request::Request;
pub use response::{Flow, HeadReader};
pub use status::{StatusClass, StatusLine};
pub use url::{Scheme, Target};
