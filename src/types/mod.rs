//! Payload types exchanged with the management API.
//!
//! These carry no behavior; they only mirror the JSON the array sends and
//! accepts, and are used as request bodies and decode destinations.

pub mod replication;
