pub mod html;
pub mod registry;
pub mod traits;

// Scraping source implementations
pub mod bvb_details;
pub mod bvb_index;
pub mod tradeville;
