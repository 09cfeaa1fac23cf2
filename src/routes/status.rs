//! `GET status` — liveness payload for monitors and load-balancers.

use async_trait::async_trait;
use http::Method;
use serde::Serialize;

use crate::error::Error;
use crate::response::{Cors, Response};
use crate::result::HttpResult;
use crate::route::Route;
use crate::session::Session;

pub struct StatusRoute;

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

#[async_trait]
impl Route for StatusRoute {
    fn path(&self) -> &'static str {
        "status"
    }

    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn validate(&self, _sess: &mut Session, _res: &mut Response) -> HttpResult {
        HttpResult::ok()
    }

    async fn handle(&self, _sess: &mut Session, res: &mut Response) -> Result<(), Error> {
        res.cors(Cors::All).json(&StatusBody { status: "ok" });
        Ok(())
    }
}
