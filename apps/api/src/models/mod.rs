pub mod design;
pub mod document;
pub mod record;
pub mod signature;
