/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const FACILITIES_ROUTE_COMPONENT: &str = "facilities";
pub const FACILITIES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", FACILITIES_ROUTE_COMPONENT);

pub const EVENTS_ROUTE_COMPONENT: &str = "events";
pub const EVENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", EVENTS_ROUTE_COMPONENT);

pub const CLASSES_ROUTE_COMPONENT: &str = "classes";
pub const CLASSES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", CLASSES_ROUTE_COMPONENT);

/// Wire format for calendar dates (`2024-09-02`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for wall-clock times (`14:30`).
pub const TIME_FORMAT: &str = "%H:%M";
