//! Operation boundary macros
//!
//! Every pipeline stage logs exactly one start event and one end (or
//! end_error) event with the canonical field set.

/// Log the start of an operation
///
/// ```
/// # use docdelta_core::log_op_start;
/// log_op_start!("align");
/// log_op_start!("extract_page", page_index = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use docdelta_core::log_op_end;
/// log_op_end!("align", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation failure; `$err` is anything convertible into `ExError`.
///
/// Defects (see `ExErrorKind::is_defect`) are logged at error level,
/// everything else at warn.
///
/// ```
/// # use docdelta_core::{log_op_error, errors::CompareError};
/// let err = CompareError::InconsistentAlignment { reason: "gap".into() };
/// log_op_error!("build_hunks", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {
        $crate::log_op_error!($op, $err, duration_ms = $duration,)
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        if ex_err.kind().is_defect() {
            tracing::error!(
                component = module_path!(),
                op = $op,
                event = $crate::types::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
                $($field)*
            );
        } else {
            tracing::warn!(
                component = module_path!(),
                op = $op,
                event = $crate::types::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
                $($field)*
            );
        }
    }};
}
