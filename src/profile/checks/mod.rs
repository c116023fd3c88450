//! Representative Profile Check Registry entries: RDAP Technical
//! Implementation Guide and Response Profile rules plus a handful of
//! supplemental conformance checks.
pub mod cors;
pub mod events;
pub mod handle;
pub mod ip_address;
pub mod label_consistency;
pub mod links;
pub mod notices;
pub mod rdap_conformance;
