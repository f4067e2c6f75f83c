mod health;
mod listing;
mod uploads;
