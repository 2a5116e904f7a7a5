// src/ffi/compression.rs
// =============================================================================
// MEDIA COMPRESSION – FFI BINDINGS
// =============================================================================
// This module exposes `CompressionService` and the shared `CompressionSession`
// to the host app. All functions follow the same conventions: JSON payloads,
// explicit success/error codes, and manual memory management for returned
// strings.
//
// MEMORY OWNERSHIP:
// - The host owns input JSON strings (read-only in Rust)
// - Rust owns output strings (the host must call compression_free)
// - All strings are UTF-8, null-terminated
//
// JSON CONTRACTS:
// - initialize: {"storage_path": "/path"}
// - select_media: {"uri": "file:///...", "mime_type": "image/jpeg"?, "file_name": "a.jpg"?, "file_size": 123?}
// - set_level / level_info: {"level": 1-10}
// - compress: {"level": 1-10?}
// - compress_media: {"asset": {"location": "...", "kind": "image|video"?, "byte_size": 123?}, "level": 1-10}
// - save_media: {"uri": "...", "kind": "image|video"}
// - format_file_size: {"bytes": 123}
//
// Levels outside 1-10 are clamped, fractional levels are truncated.
//
// SAFETY RULES:
// 1. Call compression_initialize before anything else
// 2. All input pointers must be valid, null-terminated UTF-8
// 3. Call compression_free exactly once for each returned string pointer
// 4. Check return codes before accessing result data
// -----------------------------------------------------------------------------

use crate::ffi::{handle_status_result, handle_json_result, to_ffi_error, FFIResult};
use crate::ffi::error::{FFIError, ErrorCode};
use crate::globals;
use crate::domains::compression::mapper::{format_file_size, CompressionLevel};
use crate::domains::media::types::{Asset, MediaKind, PickedMedia};
use crate::errors::DomainResult;
use crate::validation::{Validate, ValidationBuilder};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use serde::Deserialize;
use tokio::runtime::Runtime;

// -----------------------------------------------------------------------------
// DTO Types for JSON Deserialization -------------------------------------------
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct InitializeRequest {
    storage_path: String,
}

#[derive(Deserialize)]
struct LevelRequest {
    level: f64,
}

#[derive(Deserialize, Default)]
struct CompressRequest {
    level: Option<f64>,
}

#[derive(Deserialize)]
struct AssetRequest {
    location: String,
    kind: Option<String>,
    mime_type: Option<String>,
    display_name: Option<String>,
    byte_size: Option<u64>,
}

#[derive(Deserialize)]
struct CompressMediaRequest {
    asset: AssetRequest,
    level: f64,
}

#[derive(Deserialize)]
struct SaveMediaRequest {
    uri: String,
    kind: String,
}

#[derive(Deserialize)]
struct FormatFileSizeRequest {
    bytes: u64,
}

impl Validate for InitializeRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("storage_path", Some(self.storage_path.clone()))
            .required()
            .not_blank()
            .validate()
    }
}

impl Validate for AssetRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("location", Some(self.location.clone()))
            .required()
            .not_blank()
            .validate()
    }
}

impl Validate for SaveMediaRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("uri", Some(self.uri.clone()))
            .required()
            .not_blank()
            .validate()?;
        ValidationBuilder::new("kind", Some(self.kind.clone()))
            .required()
            .not_blank()
            .validate()
    }
}

// Helper to parse a media kind string
fn parse_kind(kind_str: &str) -> FFIResult<MediaKind> {
    kind_str.parse::<MediaKind>().map_err(|e| FFIError::with_details(
        ErrorCode::InvalidArgument,
        "Invalid media kind",
        &e.to_string(),
    ))
}

impl AssetRequest {
    fn into_asset(self) -> FFIResult<Asset> {
        self.validate()?;
        let kind = match &self.kind {
            Some(kind) => parse_kind(kind)?,
            None => MediaKind::detect(&self.location, self.mime_type.as_deref()),
        };
        let mut asset = Asset::new(self.location, kind);
        if let Some(name) = self.display_name {
            asset = asset.with_display_name(name);
        }
        asset.byte_size = self.byte_size.filter(|size| *size > 0);
        Ok(asset)
    }
}

// Helper to parse JSON input
fn parse_json_input<T: for<'de> Deserialize<'de>>(input: *const c_char) -> FFIResult<T> {
    if input.is_null() {
        return Err(FFIError::invalid_argument("Input JSON is null"));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    let json_str = c_str.to_str()
        .map_err(|_| FFIError::new(ErrorCode::InvalidUtf8, "Invalid UTF-8 in input JSON"))?;

    serde_json::from_str(json_str)
        .map_err(|e| FFIError::with_details(
            ErrorCode::InvalidArgument,
            "JSON parsing failed",
            &format!("Failed to parse JSON: {}", e)
        ))
}

fn new_runtime() -> FFIResult<Runtime> {
    Runtime::new()
        .map_err(|e| FFIError::with_details(ErrorCode::InternalError, "Failed to create async runtime", &e.to_string()))
}

unsafe fn write_result(result: *mut *mut c_char, json_result: *mut c_char) -> c_int {
    if !result.is_null() {
        unsafe { *result = json_result; }
    }
    if json_result.is_null() { ErrorCode::InternalError as c_int } else { ErrorCode::Success as c_int }
}

// -----------------------------------------------------------------------------
// FFI Functions ----------------------------------------------------------------
// -----------------------------------------------------------------------------

/// Initialize storage, settings, logging and the compression service
/// Input: {"storage_path": "/path"}
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_initialize(payload_json: *const c_char) -> c_int {
    handle_status_result(|| -> FFIResult<()> {
        let request: InitializeRequest = parse_json_input(payload_json)?;
        request.validate()?;
        let rt = new_runtime()?;
        rt.block_on(globals::initialize(&request.storage_path))
    })
}

/// Record the picker's selection as the current asset
/// Input: {"uri": "...", "mime_type": "..."?, "file_name": "..."?, "file_size": 123?}
/// Output: Asset JSON
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_select_media(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<Asset> {
        let picked: PickedMedia = parse_json_input(payload_json)?;
        picked.validate()?;
        let asset = Asset::from_picked(picked);
        let session = globals::get_compression_session()?;
        session.select_asset(asset.clone()).map_err(to_ffi_error)?;
        Ok(asset)
    });

    unsafe { write_result(result, json_result) }
}

/// Set the session's compression level
/// Input: {"level": 1-10}
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_set_level(payload_json: *const c_char) -> c_int {
    handle_status_result(|| -> FFIResult<()> {
        let request: LevelRequest = parse_json_input(payload_json)?;
        let session = globals::get_compression_session()?;
        session.set_level(CompressionLevel::from_f64(request.level)).map_err(to_ffi_error)
    })
}

/// Describe a level: quality, bitrate and bucket label
/// Input: {"level": 1-10}
/// Output: CompressionLevelInfo JSON
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_level_info(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<_> {
        let request: LevelRequest = parse_json_input(payload_json)?;
        let service = globals::get_compression_service()?;
        Ok(service.level_info(CompressionLevel::from_f64(request.level)))
    });

    unsafe { write_result(result, json_result) }
}

/// Compress the current selection, optionally updating the level first
/// Input: {"level": 1-10?} (a null payload keeps the current level)
/// Output: CompressionResult JSON, or {"discarded": true} if the selection
/// changed while the run was in flight
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_compress(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<serde_json::Value> {
        let request: CompressRequest = if payload_json.is_null() {
            CompressRequest::default()
        } else {
            parse_json_input(payload_json)?
        };

        let service = globals::get_compression_service()?;
        let session = globals::get_compression_session()?;
        if let Some(level) = request.level {
            session.set_level(CompressionLevel::from_f64(level)).map_err(to_ffi_error)?;
        }

        let rt = new_runtime()?;
        let outcome = rt.block_on(async {
            session.run(service.as_ref()).await
                .map_err(to_ffi_error)
        })?;

        match outcome {
            Some(compression_result) => serde_json::to_value(compression_result)
                .map_err(|e| FFIError::internal(format!("Failed to serialize result: {}", e))),
            None => Ok(serde_json::json!({"discarded": true})),
        }
    });

    unsafe { write_result(result, json_result) }
}

/// Compress an explicit asset without touching the session
/// Input: {"asset": {...}, "level": 1-10}
/// Output: CompressionResult JSON
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_compress_media(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<_> {
        let request: CompressMediaRequest = parse_json_input(payload_json)?;
        let asset = request.asset.into_asset()?;
        let level = CompressionLevel::from_f64(request.level);

        let service = globals::get_compression_service()?;
        let rt = new_runtime()?;
        rt.block_on(async {
            service.compress(&asset, level).await
                .map_err(to_ffi_error)
        })
    });

    unsafe { write_result(result, json_result) }
}

/// Save a produced asset to the device
/// Input: {"uri": "...", "kind": "image|video"}
/// Output: {"destination": SaveDestination}
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_save_media(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<serde_json::Value> {
        let request: SaveMediaRequest = parse_json_input(payload_json)?;
        request.validate()?;
        let kind = parse_kind(&request.kind)?;

        let service = globals::get_compression_service()?;
        let rt = new_runtime()?;
        let destination = rt.block_on(async {
            service.save(&request.uri, kind).await
                .map_err(to_ffi_error)
        })?;

        Ok(serde_json::json!({
            "destination": destination,
            "message": format!("{} saved to {}", kind, destination.describe()),
        }))
    });

    unsafe { write_result(result, json_result) }
}

/// Current selection, level, in-flight flag and last result
/// Output: SessionSnapshot JSON
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_get_state(result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<_> {
        let session = globals::get_compression_session()?;
        session.snapshot().map_err(to_ffi_error)
    });

    unsafe { write_result(result, json_result) }
}

/// Human-readable size, e.g. "1.5 MB"
/// Input: {"bytes": 123}
/// Output: {"formatted": "123 Bytes"}
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_format_file_size(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    let json_result = handle_json_result(|| -> FFIResult<serde_json::Value> {
        let request: FormatFileSizeRequest = parse_json_input(payload_json)?;
        Ok(serde_json::json!({"formatted": format_file_size(request.bytes)}))
    });

    unsafe { write_result(result, json_result) }
}

/// Free strings returned by the functions above
#[unsafe(no_mangle)]
pub unsafe extern "C" fn compression_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe { let _ = CString::from_raw(ptr); }
    }
}
