// In src/ffi/mod.rs
use std::os::raw::{c_int, c_char};
use std::ffi::CString;
use crate::ffi::error::{FFIError, ErrorCode};
use serde::Serialize;

pub mod error;
pub mod compression;

/// Status-only FFI calls: 0 on success, otherwise the error's `ErrorCode`
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    func().map_or_else(
        |e| {
            log::error!("[FFI] status call failed: {}", e);
            e.code as c_int
        },
        |_| ErrorCode::Success as c_int,
    )
}

/// Data-returning FFI calls. Both `Ok(T)` and `Err(FFIError)` are serialized
/// to JSON; the returned string is owned by the caller and released with
/// `compression_free`.
pub fn handle_json_result<F, T>(func: F) -> *mut c_char
where
    F: FnOnce() -> FFIResult<T>,
    T: Serialize,
{
    let serialized = match func() {
        Ok(value) => serde_json::to_string(&value),
        Err(ffi_error) => {
            log::warn!("[FFI] call failed: {}", ffi_error);
            serde_json::to_string(&ffi_error)
        }
    };

    let json = serialized.unwrap_or_else(|e| {
        internal_error_json(&format!("Failed to serialize result: {}", e))
    });
    into_c_string(json)
}

/// Error payload for failures that happen while building the response itself
fn internal_error_json(message: &str) -> String {
    log::error!("[FFI] {}", message);
    serde_json::json!({
        "code": ErrorCode::InternalError,
        "message": message,
        "details": null,
    })
    .to_string()
}

fn into_c_string(json: String) -> *mut c_char {
    match CString::new(json) {
        Ok(c_string) => c_string.into_raw(),
        Err(e) => CString::new(internal_error_json(&format!("Failed to create CString: {}", e)))
            .map_or(std::ptr::null_mut(), CString::into_raw),
    }
}

/// Convert any error implementing Clone + 'static to FFIError
pub fn to_ffi_error<E: std::error::Error + Clone + 'static>(error: E) -> FFIError {
    crate::ffi::error::to_ffi_error(&error)
}

pub use error::FFIResult;

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    fn take_json(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { compression::compression_free(ptr) };
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_handle_json_result_ok() {
        let value = take_json(handle_json_result(|| Ok(serde_json::json!({"formatted": "1 KB"}))));
        assert_eq!(value["formatted"], "1 KB");
    }

    #[test]
    fn test_handle_json_result_err() {
        let value = take_json(handle_json_result(|| -> FFIResult<()> {
            Err(FFIError::new(ErrorCode::SaveFailed, "Failed to save file"))
        }));
        assert_eq!(value["code"], "SaveFailed");
        assert_eq!(value["message"], "Failed to save file");
    }

    #[test]
    fn test_internal_error_json_escapes_message() {
        let json = internal_error_json(r#"bad "quoted" value"#);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], "InternalError");
        assert_eq!(value["message"], r#"bad "quoted" value"#);
    }

    #[test]
    fn test_nul_in_value_is_escaped() {
        let value = take_json(handle_json_result(|| Ok("a\0b".to_string())));
        assert_eq!(value, serde_json::json!("a\0b"));
    }

    #[test]
    fn test_handle_status_result_codes() {
        assert_eq!(handle_status_result(|| Ok(())), 0);
        let code = handle_status_result(|| Err(FFIError::invalid_argument("bad level")));
        assert_eq!(code, ErrorCode::InvalidArgument as c_int);
    }
}
