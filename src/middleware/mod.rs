mod gate;
mod request_id;
mod security_headers;

pub use gate::gate_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
