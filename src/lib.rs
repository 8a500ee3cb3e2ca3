pub mod argument;
pub mod cache;
pub mod fetch;
pub mod normalize;
pub mod parsers;
pub mod record;
pub mod server;
pub mod sources;
pub mod uri;
pub mod utils;
pub mod validate;
