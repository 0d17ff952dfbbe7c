// Pure helpers shared by the domains

pub mod content;
pub mod slug;

pub use content::generate_summary;
pub use slug::slug_text;
