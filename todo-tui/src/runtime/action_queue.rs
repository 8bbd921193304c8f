use crate::api::ApiError;
use crate::app::{FetchTicket, MutationTag, PendingMutation, TaskSnapshot};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Work requested by key handlers, and results reported back by spawned
/// requests. Results carry the session epoch they were started under.
#[derive(Debug)]
pub(super) enum Action {
    SubmitLogin,
    Mutate(PendingMutation),
    FetchCompleted {
        epoch: u64,
        ticket: FetchTicket,
        result: Result<TaskSnapshot, ApiError>,
    },
    MutationCompleted {
        epoch: u64,
        tag: MutationTag,
        result: Result<(), ApiError>,
    },
    SignInCompleted(Result<String, ApiError>),
    RegisterCompleted(Result<(), ApiError>),
}

pub(super) type ActionTx = UnboundedSender<Action>;
pub(super) type ActionRx = UnboundedReceiver<Action>;

pub(super) fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
