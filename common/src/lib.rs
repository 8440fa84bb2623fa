//! Stock AI Common Library
//!
//! CLIから使われる純粋なロジック:
//! アイテムストア、解析結果の型、レスポンスパーサー、プロンプト、CSV/TXT整形

pub mod types;
pub mod error;
pub mod store;
pub mod parser;
pub mod prompts;
pub mod export;

pub use types::{
    guess_mime_type, ItemId, ItemResult, ItemStatus, PromptResult, SourceFile, TrendCategory,
    VectorMetadata, WorkItem, MAX_KEYWORDS, PROMPT_SOFT_LIMIT, TITLE_MAX_CHARS,
};
pub use error::{Error, Result};
pub use store::{ItemPatch, ItemStore, StatusCounts};
pub use parser::{extract_json, parse_trend_categories, parse_vector_metadata};
pub use prompts::{build_image_prompt_prompt, build_trends_prompt, build_vector_metadata_prompt};
