//! Inbound message classification and outbound line formats
//!
//! The wire format is plain text: one received chunk is one message unit.
//! A message starting with `@ip:port ` addresses a single peer by its
//! exact address string; everything else is broadcast to every peer.
//! Administrative notices carry an `admin: ` prefix so clients can tell
//! them apart from `<address>: ` user messages.

/// Classified inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Deliver to every live session
    Broadcast(String),
    /// Deliver only to the session whose address matches exactly
    Directed { to: String, body: String },
}

/// Classify one decoded message line
///
/// A directed message is `@` immediately followed by an address token and
/// a single space; the remainder is the payload. An `@token` with no
/// following space (or with an empty token) is malformed and falls back to
/// broadcast of the whole line.
pub fn classify(line: &str) -> Inbound {
    if let Some(rest) = line.strip_prefix('@') {
        if let Some((to, body)) = rest.split_once(' ') {
            if !to.is_empty() {
                return Inbound::Directed {
                    to: to.to_string(),
                    body: body.to_string(),
                };
            }
        }
    }
    Inbound::Broadcast(line.to_string())
}

/// Strip at most one trailing line terminator from a decoded chunk
pub fn strip_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// `<sender>: <payload>` - broadcast user message
pub fn broadcast_line(sender: &str, body: &str) -> String {
    format!("{sender}: {body}\n")
}

/// `from <sender>: <payload>` - directed user message
pub fn directed_line(sender: &str, body: &str) -> String {
    format!("from {sender}: {body}\n")
}

/// `admin: <notice>` - administrative notice
pub fn admin_line(notice: &str) -> String {
    format!("admin: {notice}\n")
}

/// Roster notice enumerating every live address
pub fn roster_line(addrs: &[String]) -> String {
    admin_line(&format!("online: {}", addrs.join(", ")))
}
