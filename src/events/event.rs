use serde::{Deserialize, Serialize};

use crate::{Offset, Outcome};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadPublished {
    pub header: u32,
    pub banner: Option<u32>,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadFailed {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadScheduled {
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    Published(PayloadPublished),
    HeaderMissing,
    Failed(PayloadFailed),
    Scheduled(PayloadScheduled),
}

impl From<Offset> for PayloadPublished {
    fn from(offset: Offset) -> Self {
        Self {
            header: offset.header.get(),
            banner: offset.banner.map(crate::Px::get),
            total: offset.total().get(),
        }
    }
}

impl From<&Outcome> for Event {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Published(offset) => Event::Published((*offset).into()),
            Outcome::HeaderMissing => Event::HeaderMissing,
            Outcome::Failed(err) => Event::Failed(PayloadFailed {
                reason: err.to_string(),
            }),
        }
    }
}
