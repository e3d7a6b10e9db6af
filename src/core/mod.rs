pub mod mime;
pub mod resolver;
pub mod scanner;
