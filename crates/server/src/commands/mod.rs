pub mod allocate;
pub mod collect;
pub mod serve;
