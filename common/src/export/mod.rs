//! Export core modules shared by the CLI packager.

pub mod csv_core;
pub mod text_core;

pub use csv_core::{
    base_name, build_stock_csv, build_stock_csv_rows, canonical_file_name, unique_base_names,
    with_extension, CSV_HEADERS,
};
pub use text_core::{
    build_prompt_text, build_trend_report, format_prompt_block, DIVIDER_WIDTH,
};
