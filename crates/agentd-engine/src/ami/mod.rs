//! AMI-style telephony command gateway.
//!
//! Outbound commands are typed [`AmiAction`]s sent through an [`AmiClient`]
//! and answered with an [`AmiResponse`]. The managers only ever look at
//! [`AmiResponse::is_success`]; retry policy, if any, belongs to the
//! transport behind the client, never to the managers.

pub mod action;
pub mod client;
pub mod response;

pub use action::AmiAction;
pub use client::{AmiClient, TcpAmiClient};
pub use response::AmiResponse;
