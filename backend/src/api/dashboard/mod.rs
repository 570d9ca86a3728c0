//! Module for the dashboard API: the request summary and the widgets shown
//! next to it (to-do list, calendar, weather and exchange rates).

pub mod handlers;
pub mod routes;
pub mod widgets;
