pub mod exec;
pub mod init;
pub mod repl;

pub(crate) static USER_CANCELLED: &str = "Operation cancelled by user";
