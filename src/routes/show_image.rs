//! `GET show/image?id=<id>` — serves a show's cover image.

use std::path::PathBuf;

use async_trait::async_trait;
use http::{Method, StatusCode};

use crate::error::Error;
use crate::response::{ContentType, Cors, Response};
use crate::result::HttpResult;
use crate::route::Route;
use crate::session::Session;

/// Serves `<asset_dir>/<id>.png`, falling back to the shared placeholder
/// `<asset_dir>/show.png` when no cover exists for that id.
pub struct ShowImageRoute {
    asset_dir: PathBuf,
}

impl ShowImageRoute {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self { asset_dir: asset_dir.into() }
    }
}

/// The id becomes a file name, so anything outside this set fails closed.
fn valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl Route for ShowImageRoute {
    fn path(&self) -> &'static str {
        "show/image"
    }

    fn allowed_methods(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn validate(&self, sess: &mut Session, _res: &mut Response) -> HttpResult {
        match sess.query("id") {
            None => HttpResult::bad_request("No ID provided."),
            Some(id) if !valid_id(id) => HttpResult::bad_request("Invalid ID."),
            Some(_) => HttpResult::ok(),
        }
    }

    async fn handle(&self, sess: &mut Session, res: &mut Response) -> Result<(), Error> {
        let Some(id) = sess.query("id") else {
            return Err(Error::Invariant("show/image handled without an id".into()));
        };

        res.content(ContentType::Png)
            .cors(Cors::All)
            .status(StatusCode::OK)
            .data(self.asset_dir.join(format!("{id}.png")), self.asset_dir.join("show.png"));
        Ok(())
    }
}
