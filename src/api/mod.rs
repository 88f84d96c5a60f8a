//! Typed access to the commenter account API.
//!
//! Requests and responses are modelled in [`types`], envelope messages in
//! [`ApiMessage`], and every endpoint's status/message combinations are
//! classified into [`ActionOutcome`] or [`ReauthOutcome`] before they reach
//! callers.

mod account;
mod error;
mod message;
mod outcome;
mod picture;
pub mod types;

pub use account::{Account, ProfileChanges};
pub use error::ApiError;
pub use message::ApiMessage;
pub use outcome::{
    ActionOutcome, Field, FieldError, ReauthOutcome, Rejection, classify_login,
    classify_profile_update, classify_re_auth, classify_sign_up,
};
pub use picture::{PictureSource, initials_avatar_url};
pub use types::{Envelope, User};
