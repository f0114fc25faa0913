//! # cart-store
//!
//! Order persistence for study-cart.
//!
//! - `SupabaseOrderStore` writes to the hosted `orders` table through PostgREST
//! - `MemoryOrderStore` keeps orders in process (development and tests)
//!
//! Both ignore a second insert for the same `stripe_session_id` and never
//! move an order out of a final status.

pub mod config;
pub mod memory;
pub mod supabase;

pub use config::SupabaseConfig;
pub use memory::MemoryOrderStore;
pub use supabase::SupabaseOrderStore;
