//! C FFI bindings for ghg-core
//!
//! This crate provides a C-compatible API for embedding the emission
//! accounting core in a desktop or web presentation shell. The surface is
//! deliberately small: build a row table, push edits into it, read cells
//! and totals back out.

use ghg_core::{annotate, EditField, RowSpan, RowTable};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;

/// Opaque handle to a sector row table
pub struct FfiRowTable {
    inner: RowTable,
}

/// Create a row table from the built-in land-transport factor table
#[no_mangle]
pub extern "C" fn ghg_rows_builtin() -> *mut FfiRowTable {
    let table = ghg_core::land_transport();
    Box::into_raw(Box::new(FfiRowTable {
        inner: RowTable::generate(&table),
    }))
}

/// Create a row table from a factor-table file (.json or .csv)
///
/// # Safety
/// - `path` must be a valid C string
/// - Returns null on error
#[no_mangle]
pub unsafe extern "C" fn ghg_rows_from_file(path: *const c_char) -> *mut FfiRowTable {
    if path.is_null() {
        return ptr::null_mut();
    }

    let path = match CStr::from_ptr(path).to_str() {
        Ok(s) => Path::new(s),
        Err(_) => return ptr::null_mut(),
    };

    match ghg_core::load_factor_table(path) {
        Ok(table) => Box::into_raw(Box::new(FfiRowTable {
            inner: RowTable::generate(&table),
        })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a row table
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function or null
#[no_mangle]
pub unsafe extern "C" fn ghg_free_rows(table: *mut FfiRowTable) {
    if !table.is_null() {
        drop(Box::from_raw(table));
    }
}

/// Get the number of rows in a table
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
#[no_mangle]
pub unsafe extern "C" fn ghg_row_count(table: *const FfiRowTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.row_count()
}

/// Get a row's composite key by index
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `ghg_free_string`
#[no_mangle]
pub unsafe extern "C" fn ghg_row_key(table: *const FfiRowTable, index: usize) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    (&(*table).inner.rows)
        .get(index)
        .and_then(|r| CString::new(r.key.as_str()).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Get a row as a JSON object, including its derived emissions
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `ghg_free_string`
#[no_mangle]
pub unsafe extern "C" fn ghg_row_json(table: *const FfiRowTable, index: usize) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    let row = match (&(*table).inner.rows).get(index) {
        Some(r) => r,
        None => return ptr::null_mut(),
    };

    let value = serde_json::json!({
        "row": row,
        "emissions": row.emissions(),
    });

    serde_json::to_string(&value)
        .ok()
        .and_then(|s| CString::new(s).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Apply an edit to a row: field 0 = vehicle count, 1 = distance (km)
///
/// Returns 0 on success, non-zero on unknown key or field.
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
/// - `key` and `value` must be valid C strings
#[no_mangle]
pub unsafe extern "C" fn ghg_apply_edit(
    table: *mut FfiRowTable,
    key: *const c_char,
    field: u32,
    value: *const c_char,
) -> i32 {
    if table.is_null() || key.is_null() || value.is_null() {
        return -1;
    }

    let key = match CStr::from_ptr(key).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };
    let value = match CStr::from_ptr(value).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };
    let field = match field {
        0 => EditField::VehicleCount,
        1 => EditField::DistanceKm,
        _ => return -1,
    };

    match (*table).inner.apply_edit(key, field, value) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Get the sector total in metric tons CO2e
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
#[no_mangle]
pub unsafe extern "C" fn ghg_total_co2e_t(table: *const FfiRowTable) -> f64 {
    if table.is_null() {
        return 0.0;
    }
    (*table).inner.total_co2e_t()
}

/// Get the row-span annotations as a JSON array
///
/// # Safety
/// - `table` must be a valid pointer returned by a ghg_rows_* function
/// - Caller must free the returned string with `ghg_free_string`
#[no_mangle]
pub unsafe extern "C" fn ghg_row_spans_json(table: *const FfiRowTable) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    let spans: Vec<RowSpan> = annotate(&(*table).inner.rows);

    serde_json::to_string(&spans)
        .ok()
        .and_then(|s| CString::new(s).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a ghg_* function or null
#[no_mangle]
pub unsafe extern "C" fn ghg_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
