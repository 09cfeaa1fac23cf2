//! Minimal showboard deployment — the calibration routes and a status check.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/status
//!   curl http://localhost:3000/show/image?id=42 --output show.png
//!   curl -X POST http://localhost:3000/moderation
//!   curl -X DELETE http://localhost:3000/status        # 405
//!   curl http://localhost:3000/nope                    # 404

use showboard::routes::{ModerationRoute, ShowImageRoute, StatusRoute};
use showboard::{App, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .register(StatusRoute)
        .register(ShowImageRoute::new("shows"))
        .register(ModerationRoute);

    Server::bind("0.0.0.0:3000")
        .serve(App::new(router))
        .await
        .expect("server error");
}
