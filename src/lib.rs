pub mod ast;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod lexer;
pub mod logging;
pub mod sql_compiler;
pub mod timespec;
pub mod token;
pub mod transport;
pub mod url_filter;
