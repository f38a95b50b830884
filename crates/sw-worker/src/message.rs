//! Client message protocol.

use std::fmt;

/// Commands a client can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Activate a waiting worker immediately. The client reloads to observe it.
    SkipWaiting,
    /// Fetch every manifest resource not yet cached.
    DownloadOffline,
}

impl WorkerMessage {
    /// Parse a message payload. Only exact matches are recognized.
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }

    /// The wire form of the message.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipWaiting => "skipWaiting",
            Self::DownloadOffline => "downloadOffline",
        }
    }
}

impl fmt::Display for WorkerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact() {
        assert_eq!(WorkerMessage::parse("skipWaiting"), Some(WorkerMessage::SkipWaiting));
        assert_eq!(
            WorkerMessage::parse("downloadOffline"),
            Some(WorkerMessage::DownloadOffline)
        );
    }

    #[test]
    fn test_parse_rejects_near_misses() {
        assert_eq!(WorkerMessage::parse("skipwaiting"), None);
        assert_eq!(WorkerMessage::parse(" skipWaiting"), None);
        assert_eq!(WorkerMessage::parse(""), None);
    }

    #[test]
    fn test_display_round_trips() {
        for msg in [WorkerMessage::SkipWaiting, WorkerMessage::DownloadOffline] {
            assert_eq!(WorkerMessage::parse(&msg.to_string()), Some(msg));
        }
    }
}
