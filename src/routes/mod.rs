//! Concrete API routes.
//!
//! Each route is a stateless unit registered once at startup. Business
//! semantics live here; everything about how a request reaches a route and
//! how its response leaves belongs to the dispatch core.

mod moderation;
mod show_image;
mod status;

pub use moderation::ModerationRoute;
pub use show_image::ShowImageRoute;
pub use status::StatusRoute;
