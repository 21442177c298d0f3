pub mod backend;
pub mod contact_bridge;
pub mod headless;
pub mod raycast;
pub mod rigidbody;
