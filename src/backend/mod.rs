mod backend_interface;
mod fixture_backend;
pub mod paths;
mod remote_backend;

pub use backend_interface::{
    delete, get_json, post_json, put_json, BackendGateway, BackendReply, ErrorDetails,
    ErrorLayer, GatewayError, Method, Result,
};
pub use fixture_backend::{make_fixture_backend, FixtureBackend, FixtureFile, RecordedRequest};
pub use remote_backend::{make_remote_backend, TOKEN_HEADER};
