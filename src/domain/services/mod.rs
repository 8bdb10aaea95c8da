mod conversation;
mod dispatcher;
pub mod replies;
mod retry;
mod roaster;

pub use conversation::*;
pub use dispatcher::*;
pub use retry::*;
pub use roaster::*;
