//! Ad request orchestration for the Adstage ad demo stack.
//!
//! Three clients sit on top of the backend:
//!
//! - [`BiddingOrchestrator`] -- header-bidding slots: waits for an
//!   [`AuctionPrimitive`], collects bids under a deadline, renders the
//!   winner or the fallback creative
//! - [`AdServerClient`] -- standalone slots: one `POST /api/ads` per
//!   render, with a locally synthesized creative when the backend fails
//! - [`PromptProxyClient`] -- `POST /api/openai`, errors classified for
//!   the caller; [`AcademicSearch`] builds topic searches on top of it
//!
//! [`AdContext`] wires all three from a [`ClientConfig`]. Rendering goes
//! through [`Surface`]s, which order concurrent writes and discard
//! everything after teardown.
//!
//! # Architecture
//!
//! ```text
//! AdContext --> BiddingOrchestrator --> AuctionPrimitive --> Surface
//!           --> AdServerClient --------> POST /api/ads ----> Surface
//!           --> PromptProxyClient -----> POST /api/openai
//!           --> AcademicSearch --------> PromptProxyClient
//! ```

pub mod ad_server;
pub mod auction;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod search;
pub mod surface;

pub use ad_server::{AdOrigin, AdRenderOutcome, AdServerClient, Delivery};
pub use auction::{
    AuctionLoader, AuctionPrimitive, AuctionReadiness, SharedAuction, StandbyAuction,
    SyntheticAuction, SyntheticAuctionSettings, auction_channel,
};
pub use config::ClientConfig;
pub use context::AdContext;
pub use error::ClientError;
pub use orchestrator::{BiddingOrchestrator, OrchestratorTimings, RenderOutcome, select_winning_bid};
pub use prompt::PromptProxyClient;
pub use search::{
    AcademicSearch, Paper, SEARCH_MAX_TOKENS, SearchOutcome, describe_selection, filter_papers,
    mock_papers, search_prompt,
};
pub use surface::{RenderTicket, Surface, WriteStatus};
