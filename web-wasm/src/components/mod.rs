//! UI 组件
pub mod category_bar;
pub mod header;
pub mod progress_bar;
pub mod report_card;
pub mod report_detail;
pub mod report_list;
pub mod settings_panel;
pub mod upload_modal;
