pub mod docx;
pub mod extractor;
pub mod pages;
pub mod question_parser;
pub mod question_store;

pub use docx::DocxExtractor;
pub use extractor::{ExtractorRegistry, TextExtractor};
pub use pages::PagesExtractor;
pub use question_parser::{OpenAiQuestionParser, QuestionParser};
pub use question_store::{PgQuestionStore, QuestionStore};
