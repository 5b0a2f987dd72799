pub mod evaluation_service;
pub mod templates;

/// The notified alert categories. Intermediate "still down" checks are
/// persisted but never notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Problem,
    Critical,
    Recovered,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Problem => "outage_started",
            AlertKind::Critical => "escalated",
            AlertKind::Recovered => "recovered",
        }
    }
}
