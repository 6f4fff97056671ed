pub mod campaign;
pub mod docs;
pub mod model;
pub mod post;
pub mod status;
pub mod template;
