pub mod edit_path;
pub mod hash_password;
pub mod init;
pub mod serve;

pub use edit_path::{edit_path, EditPathArgs};
pub use hash_password::{hash_password, HashPasswordArgs};
pub use init::{init, InitArgs};
pub use serve::{serve, ServeArgs};
