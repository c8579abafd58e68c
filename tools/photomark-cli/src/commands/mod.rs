pub mod export;
pub mod fonts;
pub mod preview;
pub mod template;
pub mod watermark;
