//! Shared type definitions for the Adstage ad demo stack.
//!
//! This crate is the single source of truth for the wire types exchanged
//! between the backend and its clients. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the front end.
//!
//! # Modules
//!
//! - [`slot`] -- Ad slots, sizes, and header-bidding ad units
//! - [`bid`] -- Bids produced by an auction
//! - [`ad`] -- Standalone ad server request/response payloads
//! - [`prompt`] -- Prompt proxy payloads and the shared error body
//! - [`catalog`] -- Built-in slot and ad unit catalogs

pub mod ad;
pub mod bid;
pub mod catalog;
pub mod prompt;
pub mod slot;

// Re-export all public types at crate root for convenience.
pub use ad::{AdRequest, AdResponse, CatalogResponse, SlotCatalogEntry, SspDemoResponse, Targeting};
pub use bid::BidResult;
pub use prompt::{DEFAULT_MAX_TOKENS, ErrorBody, ErrorKind, PromptRequest, PromptResponse};
pub use slot::{AdSlot, AdType, AdUnit, BidderConfig, Size};
