pub mod health;
pub mod parse_question;
pub mod upload_question;

pub use health::*;
pub use parse_question::*;
pub use upload_question::*;
