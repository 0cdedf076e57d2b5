pub mod filename;
pub mod media_type;

pub use filename::{extname, repair_form_data_name, sanitize_filename, sanitize_path_segment};
pub use media_type::is_supported_media_type;
