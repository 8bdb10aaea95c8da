mod backend;
mod chat;
mod chat_command;
mod profile;
mod prompt;
mod roast;
mod session;

pub use backend::*;
pub use chat::*;
pub use chat_command::*;
pub use profile::*;
pub use prompt::*;
pub use roast::*;
pub use session::*;
