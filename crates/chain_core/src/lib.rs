//! Chain core: pure coordination state machine for option-chain collection runs.
mod effect;
mod msg;
mod nav;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use nav::chain_page_url;
pub use state::{CoordinatorSettings, CoordinatorState, PendingRequest, RequestStatus};
pub use types::{
    CollectionFailure, CollectionResult, FailureReason, OptionRow, OptionType, PosId, RejectReason,
    TabId,
};
pub use update::update;
pub use view_model::{ProgressView, RequestRowView};
