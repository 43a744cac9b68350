pub mod cache;
pub mod esi;
pub mod export;
