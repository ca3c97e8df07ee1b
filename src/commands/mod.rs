pub mod delete_act;
pub mod parse;
pub mod review;
pub mod scrape;
pub mod status;

mod batch;
