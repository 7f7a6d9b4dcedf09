//! Auth-provider webhook receiver.
//!
//! Only `user.created` is acted on: the signup is counted, a welcome email is
//! sent through the injected `EmailSender`, and the send is timed and counted
//! by outcome. Other event types are rejected with 400 and leave metrics alone.

pub mod event;
pub mod handler;

pub use event::{WebhookEvent, USER_CREATED};
pub use handler::{clerk_webhook, handle_event, Outcome};
