pub mod observation;
pub mod open_weather;
pub mod google_sheets;
