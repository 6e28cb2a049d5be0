pub mod aggregate;
pub mod config;
pub mod ctx;
pub mod dispatch;
pub mod get_terminal_width;
pub mod output_table;
pub mod parse;
pub mod record;
pub mod render;
pub mod report_kind;
pub mod series;
pub mod utillib;
