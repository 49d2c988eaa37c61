//! Notice board for surfacing failures to the user, fed directly or from
//! client errors.

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::client::ClientError;

/// Info notices disappear after this long.
pub const INFO_TTL: Duration = Duration::seconds(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub level: NoticeLevel,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn add(
        &mut self,
        message: impl Into<String>,
        level: NoticeLevel,
        source: Option<&str>,
    ) -> Uuid {
        self.add_at(message, level, source, OffsetDateTime::now_utc())
    }

    pub fn add_at(
        &mut self,
        message: impl Into<String>,
        level: NoticeLevel,
        source: Option<&str>,
        timestamp: OffsetDateTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.notices.push(Notice {
            id,
            message: message.into(),
            level,
            timestamp,
            source: source.map(str::to_owned),
        });
        id
    }

    pub fn remove(&mut self, id: Uuid) {
        self.notices.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }

    /// Drops info notices older than [`INFO_TTL`]; errors and warnings stay
    /// until removed.
    pub fn expire(&mut self, now: OffsetDateTime) {
        self.notices
            .retain(|n| n.level != NoticeLevel::Info || now - n.timestamp < INFO_TTL);
    }

    /// Classifies a failed API call: client errors are warnings, everything
    /// else is an error.
    pub fn report(&mut self, err: &ClientError) -> Uuid {
        match err {
            ClientError::Status { status, message } => {
                let text = message.as_deref().unwrap_or("Server error");
                let level = if (400..500).contains(status) {
                    NoticeLevel::Warning
                } else {
                    NoticeLevel::Error
                };
                self.add(format!("{text} ({status})"), level, Some("API"))
            }
            ClientError::Transport(_) => self.add(
                "Connection error. Check your internet connection.",
                NoticeLevel::Error,
                Some("Network"),
            ),
            ClientError::Decode(_) => {
                self.add("Unexpected error", NoticeLevel::Error, Some("System"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_and_clear() {
        let mut board = NoticeBoard::new();
        let a = board.add("first", NoticeLevel::Error, None);
        board.add("second", NoticeLevel::Warning, Some("form"));
        board.remove(a);
        assert_eq!(board.notices().len(), 1);
        assert_eq!(board.notices()[0].source.as_deref(), Some("form"));
        board.clear();
        assert!(board.notices().is_empty());
    }

    #[test]
    fn only_info_notices_expire() {
        let mut board = NoticeBoard::new();
        let t0 = OffsetDateTime::now_utc();
        board.add_at("saved", NoticeLevel::Info, None, t0);
        board.add_at("broken", NoticeLevel::Error, None, t0);

        board.expire(t0 + Duration::seconds(4));
        assert_eq!(board.notices().len(), 2);

        board.expire(t0 + Duration::seconds(5));
        assert_eq!(board.notices().len(), 1);
        assert_eq!(board.notices()[0].message, "broken");
    }

    #[test]
    fn api_errors_are_classified_by_status() {
        let mut board = NoticeBoard::new();
        board.report(&ClientError::Status {
            status: 404,
            message: Some("Product not found".into()),
        });
        board.report(&ClientError::Status {
            status: 500,
            message: None,
        });
        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        board.report(&ClientError::Decode(decode));

        let notices = board.notices();
        assert_eq!(notices[0].message, "Product not found (404)");
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].source.as_deref(), Some("API"));
        assert_eq!(notices[1].message, "Server error (500)");
        assert_eq!(notices[1].level, NoticeLevel::Error);
        assert_eq!(notices[2].source.as_deref(), Some("System"));
    }
}
