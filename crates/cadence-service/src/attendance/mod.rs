//! Attendance bound to resolved occurrences.

pub mod reconciler;
pub mod tracking;

pub use reconciler::{
    AttendanceEntry, AttendanceFilter, AttendanceRate, LogAttendance, LoggedAttendance,
    attendance_rate, delete_attendance, list_attendance, log_attendance,
};
