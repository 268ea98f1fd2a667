//! FFI bindings for Smile Flux
//!
//! This module provides C-compatible functions for calling Flux from the host
//! app (Swift/Kotlin via a C header). All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `smile_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::ScorerConfig;
use crate::pipeline::{score_frame_json, SmileProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Like `cstr_to_string`, recording an error naming the argument on failure
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string pointer"));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a single frame record and return a scored-frame JSON object.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `smile_free_string`.
/// - Returns NULL on error; call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_score_frame(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    match score_frame_json(&json_str) {
        Ok(out) => string_to_cstr(&out),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a SmileProcessor
pub struct SmileProcessorHandle {
    processor: SmileProcessor,
}

/// Create a new SmileProcessor.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it
///   must be a valid null-terminated C string holding a scorer config.
/// - Returns a pointer that must be freed with `smile_processor_free`.
/// - Returns NULL on error; call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_new(
    config_json: *const c_char,
) -> *mut SmileProcessorHandle {
    clear_last_error();

    let processor = if config_json.is_null() {
        Ok(SmileProcessor::new())
    } else {
        let Some(json_str) = required_arg(config_json, "config") else {
            return ptr::null_mut();
        };
        ScorerConfig::from_json(&json_str).and_then(SmileProcessor::with_config)
    };

    match processor {
        Ok(processor) => Box::into_raw(Box::new(SmileProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a SmileProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `smile_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_free(processor: *mut SmileProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Process one frame with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `smile_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `smile_free_string`.
/// - Returns NULL on error; call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_process(
    processor: *mut SmileProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(json_str) = required_arg(json, "JSON") else {
        return ptr::null_mut();
    };

    let scored = handle
        .processor
        .process_json(&json_str)
        .and_then(|frame| serde_json::to_string(&frame).map_err(Into::into));

    match scored {
        Ok(out) => string_to_cstr(&out),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Build a session report for the frames processed so far.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `smile_processor_new`.
/// - Returns a newly allocated string that must be freed with `smile_free_string`.
/// - Returns NULL on error; call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_report(
    processor: *mut SmileProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.report_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Save processor statistics to JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `smile_processor_new`.
/// - Returns a newly allocated string that must be freed with `smile_free_string`.
/// - Returns NULL on error; call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_save_stats(
    processor: *mut SmileProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match handle.processor.save_stats() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Load processor statistics from JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `smile_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `smile_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn smile_processor_load_stats(
    processor: *mut SmileProcessorHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    let handle = &mut *processor;

    let Some(json_str) = required_arg(json, "JSON") else {
        return -1;
    };

    match handle.processor.load_stats(&json_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn smile_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Flux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn smile_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Flux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn smile_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smiling_frame_json() -> CString {
        let mut points = vec![serde_json::json!({"x": 0.5, "y": 0.5}); 14];
        points[3] = serde_json::json!({"x": 0.5, "y": 0.9});
        points[7] = serde_json::json!({"x": 0.9, "y": 0.8});
        points[10] = serde_json::json!({"x": 0.5, "y": 0.4});
        points[13] = serde_json::json!({"x": 0.1, "y": 0.8});
        let json = serde_json::json!({
            "frame_index": 0,
            "sample": {
                "points": points,
                "face_bounding_box": {"x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0}
            }
        });
        CString::new(json.to_string()).unwrap()
    }

    #[test]
    fn test_ffi_score_frame() {
        let json = CString::new(r#"{"frame_index": 3}"#).unwrap();

        unsafe {
            let result = smile_score_frame(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"frame_index\":3"));
            assert!(result_str.contains("no_face"));

            smile_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let config = CString::new(r#"{"transform": "identity"}"#).unwrap();

        unsafe {
            let processor = smile_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let frame = smiling_frame_json();
            let result = smile_processor_process(processor, frame.as_ptr());
            assert!(!result.is_null());
            let result_str = CStr::from_ptr(result).to_str().unwrap();
            assert!(result_str.contains("\"score\":80"));
            smile_free_string(result);

            let report = smile_processor_report(processor);
            assert!(!report.is_null());
            assert!(CStr::from_ptr(report)
                .to_str()
                .unwrap()
                .contains("smile.report.v1"));
            smile_free_string(report);

            let stats = smile_processor_save_stats(processor);
            assert!(!stats.is_null());

            let processor2 = smile_processor_new(ptr::null());
            assert!(!processor2.is_null());
            assert_eq!(smile_processor_load_stats(processor2, stats), 0);
            assert_eq!((*processor2).processor.frame_count(), 1);

            smile_free_string(stats);
            smile_processor_free(processor);
            smile_processor_free(processor2);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid_json = CString::new("not json").unwrap();

        unsafe {
            let result = smile_score_frame(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = smile_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            // a successful call clears the error
            let ok = CString::new("{}").unwrap();
            let result = smile_score_frame(ok.as_ptr());
            assert!(!result.is_null());
            assert!(smile_last_error().is_null());
            smile_free_string(result);
        }
    }

    #[test]
    fn test_ffi_bad_config_and_null_handle() {
        let bad = CString::new(r#"{"smile_threshold": -1}"#).unwrap();

        unsafe {
            assert!(smile_processor_new(bad.as_ptr()).is_null());
            assert!(!smile_last_error().is_null());

            assert!(smile_processor_report(ptr::null_mut()).is_null());
            assert_eq!(
                smile_processor_load_stats(ptr::null_mut(), bad.as_ptr()),
                -1
            );
        }
    }

    #[test]
    fn test_ffi_numeric_limits_return_errors() {
        let last_index = CString::new(r#"{"frame_index": 18446744073709551615}"#).unwrap();
        let huge_landmark =
            CString::new(r#"{"landmarks": {"top": 18446744073709551615}}"#).unwrap();
        let full_stats = CString::new(r#"{"frames_total": 18446744073709551615}"#).unwrap();
        let frame = CString::new("{}").unwrap();

        unsafe {
            assert!(smile_score_frame(last_index.as_ptr()).is_null());
            assert!(!smile_last_error().is_null());

            assert!(smile_processor_new(huge_landmark.as_ptr()).is_null());
            assert!(!smile_last_error().is_null());

            let processor = smile_processor_new(ptr::null());
            assert_eq!(smile_processor_load_stats(processor, full_stats.as_ptr()), 0);
            let result = smile_processor_process(processor, frame.as_ptr());
            assert!(!result.is_null());
            assert_eq!((*processor).processor.frame_count(), u64::MAX);

            smile_free_string(result);
            smile_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = smile_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::SMILE_FLUX_VERSION);
        }
    }
}
