pub mod content;
pub mod identity;

pub use content::ContentItem;
pub use identity::{AnalyticsToken, ViewerId};
