// Public modules
pub mod domains;
pub mod errors;
pub mod ffi;
pub mod globals;
pub mod validation;

// Entry point for initialization
/// Initialize the library with the given storage root.
/// This function must be called before any other function in the library.
pub async fn initialize(storage_path: &str) -> ffi::FFIResult<()> {
    globals::initialize(storage_path).await
}

/// Check whether `initialize` has completed
pub fn is_initialized() -> bool {
    globals::is_initialized()
}
