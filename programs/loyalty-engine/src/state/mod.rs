pub mod roadmap;
pub mod benefits;
pub mod profile;

pub use roadmap::*;
pub use benefits::*;
pub use profile::*;
