//! Composable health reporting.
//!
//! Mirrors the platform's status convention: each component contributes an
//! `ok`/`fail` entry and the server aggregates them into the body served on
//! `GET /status`.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::bus::BusConsumer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: Status,
}

impl From<Status> for ComponentStatus {
    fn from(status: Status) -> Self {
        Self { status }
    }
}

/// Aggregated health of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub bus_consumer: ComponentStatus,
    pub service_token: ComponentStatus,
}

/// Aggregates the per-component flags into a [`StatusSummary`].
pub struct HealthReporter {
    consumer: BusConsumer,
    service_token_ok: AtomicBool,
}

impl HealthReporter {
    pub fn new(consumer: BusConsumer) -> Self {
        Self {
            consumer,
            service_token_ok: AtomicBool::new(true),
        }
    }

    /// Flipped by the auth token renewal loop.
    pub fn set_service_token_ok(&self, ok: bool) {
        self.service_token_ok.store(ok, Ordering::SeqCst);
    }

    pub fn summary(&self) -> StatusSummary {
        let service_token = if self.service_token_ok.load(Ordering::SeqCst) {
            Status::Ok
        } else {
            Status::Fail
        };
        StatusSummary {
            bus_consumer: self.consumer.provide_status().into(),
            service_token: service_token.into(),
        }
    }
}
