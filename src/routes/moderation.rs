//! `POST moderation` — records a moderation log entry.
//!
//! The write path is not built yet. Validation requests the `"db"`
//! middleware so the data-layer gate already applies, then fails closed
//! with `Not implemented` no matter the payload.
//!
//! TODO: implement the moderation log write and drop the fail-closed
//! rejection once the entry schema is settled.

use async_trait::async_trait;
use http::{Method, StatusCode};

use crate::error::Error;
use crate::response::{Cors, Response};
use crate::result::HttpResult;
use crate::route::Route;
use crate::session::Session;

pub struct ModerationRoute;

#[async_trait]
impl Route for ModerationRoute {
    fn path(&self) -> &'static str {
        "moderation"
    }

    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::POST]
    }

    fn validate(&self, sess: &mut Session, _res: &mut Response) -> HttpResult {
        let gate = sess.middleware("db");
        if gate.is_error() {
            return gate;
        }
        HttpResult::bad_request("Not implemented")
    }

    async fn handle(&self, _sess: &mut Session, res: &mut Response) -> Result<(), Error> {
        // Unreachable while validate fails closed; kept honest anyway.
        res.status(StatusCode::BAD_REQUEST).cors(Cors::All).error("Not implemented");
        Ok(())
    }
}
